//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`,
//! and tagged enums with explicit discriminants. Conversion functions live
//! here to keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Arrays handed to C are leaked boxed slices, so length always equals
//! capacity when they come back to be freed.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use mediashare_core::{
    ApiError, HttpMethod, LoginResponse, MediaItem, MediaListing, TaggedFile, User,
};

/// Opaque handle to a `MediaShareClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: mediashare_core::MediaShareClient,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Owned C string. Interior NULs are dropped rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) fn c_string_opt(s: Option<String>) -> *mut c_char {
    s.map(c_string).unwrap_or(std::ptr::null_mut())
}

/// Free a string produced by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Length as carried in C structs. `None` when it does not fit in `u32`.
pub(crate) fn ffi_len(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

/// Convert `items` with `f` and leak the result as a boxed slice.
///
/// The length is checked before `f` runs, so nothing `f` allocates is
/// leaked when the list is too long for the C side.
pub(crate) fn leak_mapped<S, T>(items: Vec<S>, f: impl FnMut(S) -> T) -> Option<(*mut T, u32)> {
    let len = ffi_len(items.len())?;
    if len == 0 {
        return Some((std::ptr::null_mut(), 0));
    }
    let converted: Vec<T> = items.into_iter().map(f).collect();
    let ptr = Box::into_raw(converted.into_boxed_slice()) as *mut T;
    Some((ptr, len))
}

/// Take back a slice produced by `leak_mapped`.
///
/// # Safety
/// `ptr`/`len` must come from one `leak_mapped` call and not be reclaimed twice.
pub(crate) unsafe fn reclaim_slice<T>(ptr: *mut T, len: u32) -> Box<[T]> {
    if ptr.is_null() || len == 0 {
        return Box::new([]);
    }
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len as usize)) }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `ms_build_*` functions. The host executes the request and
/// passes the response back through the matching `ms_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    /// Null if the header count does not fit the C struct.
    pub(crate) fn from_core(req: mediashare_core::HttpRequest) -> *mut Self {
        let Some((headers, headers_len)) = leak_mapped(req.headers, |(k, v)| FfiHeader {
            key: c_string(k),
            value: c_string(v),
        }) else {
            return std::ptr::null_mut();
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path: c_string(req.path),
            headers,
            headers_len,
            body: c_string_opt(req.body),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host constructs this after executing a request and passes a pointer
/// to an `ms_parse_*` function. The FFI layer reads but does not free it.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    Server = 1,
    Transport = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    /// A list was longer than a `u32` length can describe.
    TooLarge = 7,
}

/// Tag that tells `ms_free_result` what `FfiResult::data` points to.
#[derive(Clone, Copy)]
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    Session = 1,
    User = 2,
    Created = 3,
    Message = 4,
    Availability = 5,
    FileIds = 6,
    Media = 7,
    MediaList = 8,
}

#[repr(C)]
pub struct FfiUser {
    pub user_id: u64,
    pub username: *mut c_char,
    pub email: *mut c_char,
    /// Null when the user has no full name.
    pub full_name: *mut c_char,
}

impl FfiUser {
    fn from_core(user: User) -> Self {
        FfiUser {
            user_id: user.user_id,
            username: c_string(user.username),
            email: c_string(user.email),
            full_name: c_string_opt(user.full_name),
        }
    }

    pub(crate) fn free_fields(&self) {
        free_c_string(self.username);
        free_c_string(self.email);
        free_c_string(self.full_name);
    }
}

/// Login payload.
#[repr(C)]
pub struct FfiSession {
    pub message: *mut c_char,
    pub token: *mut c_char,
    pub user: FfiUser,
}

/// Confirmation carrying the id of the created record (user or tag).
#[repr(C)]
pub struct FfiCreated {
    pub message: *mut c_char,
    pub id: u64,
}

#[repr(C)]
pub struct FfiMessage {
    pub message: *mut c_char,
}

#[repr(C)]
pub struct FfiAvailability {
    pub available: bool,
}

/// File ids from a media listing, in listing order.
#[repr(C)]
pub struct FfiFileIdList {
    pub ids: *mut u64,
    pub len: u32,
}

#[repr(C)]
pub struct FfiMediaItem {
    pub file_id: u64,
    pub user_id: u64,
    pub filename: *mut c_char,
    pub title: *mut c_char,
    pub description: *mut c_char,
    pub media_type: *mut c_char,
    pub mime_type: *mut c_char,
    pub time_added: *mut c_char,
    /// Bytes; 0 when the server did not report a size.
    pub filesize: u64,
    /// Thumbnail paths, each null when absent.
    pub thumbnail_w160: *mut c_char,
    pub thumbnail_w320: *mut c_char,
    pub thumbnail_w640: *mut c_char,
    /// Null unless the item came from a tag query.
    pub tag: *mut c_char,
}

impl FfiMediaItem {
    fn from_core(item: MediaItem, tag: Option<String>) -> Self {
        let thumbs = item.thumbnails.unwrap_or_default();
        FfiMediaItem {
            file_id: item.file_id,
            user_id: item.user_id,
            filename: c_string(item.filename),
            title: c_string(item.title),
            description: c_string(item.description),
            media_type: c_string(item.media_type),
            mime_type: c_string(item.mime_type),
            time_added: c_string(item.time_added),
            filesize: item.filesize.unwrap_or(0),
            thumbnail_w160: c_string_opt(thumbs.w160),
            thumbnail_w320: c_string_opt(thumbs.w320),
            thumbnail_w640: c_string_opt(thumbs.w640),
            tag: c_string_opt(tag),
        }
    }

    pub(crate) fn free_fields(&self) {
        for s in [
            self.filename,
            self.title,
            self.description,
            self.media_type,
            self.mime_type,
            self.time_added,
            self.thumbnail_w160,
            self.thumbnail_w320,
            self.thumbnail_w640,
            self.tag,
        ] {
            free_c_string(s);
        }
    }
}

#[repr(C)]
pub struct FfiMediaList {
    pub items: *mut FfiMediaItem,
    pub len: u32,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn ok<T>(data_tag: FfiDataTag, payload: T) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data: Box::into_raw(Box::new(payload)) as *mut c_void,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_session(login: LoginResponse) -> *mut Self {
        Self::ok(
            FfiDataTag::Session,
            FfiSession {
                message: c_string(login.message),
                token: c_string(login.token),
                user: FfiUser::from_core(login.user),
            },
        )
    }

    pub(crate) fn ok_user(user: User) -> *mut Self {
        Self::ok(FfiDataTag::User, FfiUser::from_core(user))
    }

    pub(crate) fn ok_created(message: String, id: u64) -> *mut Self {
        Self::ok(
            FfiDataTag::Created,
            FfiCreated {
                message: c_string(message),
                id,
            },
        )
    }

    pub(crate) fn ok_message(message: String) -> *mut Self {
        Self::ok(
            FfiDataTag::Message,
            FfiMessage {
                message: c_string(message),
            },
        )
    }

    pub(crate) fn ok_availability(available: bool) -> *mut Self {
        Self::ok(FfiDataTag::Availability, FfiAvailability { available })
    }

    pub(crate) fn ok_file_ids(listing: Vec<MediaListing>) -> *mut Self {
        match leak_mapped(listing, |l| l.file_id) {
            Some((ids, len)) => Self::ok(FfiDataTag::FileIds, FfiFileIdList { ids, len }),
            None => Self::too_large("media listing"),
        }
    }

    pub(crate) fn ok_media(item: MediaItem) -> *mut Self {
        Self::ok(FfiDataTag::Media, FfiMediaItem::from_core(item, None))
    }

    pub(crate) fn ok_tagged_files(files: Vec<TaggedFile>) -> *mut Self {
        match leak_mapped(files, |f| FfiMediaItem::from_core(f.media, Some(f.tag))) {
            Some((items, len)) => Self::ok(FfiDataTag::MediaList, FfiMediaList { items, len }),
            None => Self::too_large("tagged file list"),
        }
    }

    pub(crate) fn too_large(what: &str) -> *mut Self {
        Self::err(FfiErrorCode::TooLarge, 0, format!("{what} is too long"))
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let code = match &err {
            ApiError::Server { .. } => FfiErrorCode::Server,
            ApiError::Transport(_) => FfiErrorCode::Transport,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
        };
        Self::err(code, err.status().unwrap_or(0), err.message())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
