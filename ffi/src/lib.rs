//! C-ABI wrapper around `mediashare-core`.
//!
//! # Overview
//! Exposes the media-sharing API through `extern "C"` functions so a native
//! mobile host (Swift, Kotlin via JNI, or plain C) can build requests and
//! parse responses without linking an async runtime or serde.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `ms_build_*` / `ms_parse_*` mirror the core client 1:1. Hydrating a
//!   media page is the host's job: parse the listing with
//!   `ms_parse_list_media`, then build one `ms_build_get_media` per id.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The caller owns all returned pointers and must call the matching
//!   `ms_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use mediashare_core::{
    ApiError, Credentials, HttpRequest, HttpResponse, MediaPage, MediaShareClient, NewTag,
    NewUser, UserUpdate,
};

use types::*;

/// Read a C string argument. `None` for null.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Run a builder against a live client handle, returning null on a null
/// handle, a builder error, or a panic.
fn build_with<F>(client: *const FfiClient, f: F) -> *mut FfiHttpRequest
where
    F: FnOnce(&MediaShareClient) -> Option<Result<HttpRequest, ApiError>>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match f(&client.inner) {
            Some(Ok(req)) => FfiHttpRequest::from_core(req),
            _ => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body
/// reads as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body: read_str(resp.body).unwrap_or_default(),
    }
}

fn parse_with<F>(
    name: &'static str,
    client: *const FfiClient,
    response: *const FfiHttpResponse,
    f: F,
) -> *mut FfiResult
where
    F: FnOnce(&MediaShareClient, HttpResponse) -> *mut FfiResult,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        f(&client.inner, resp)
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {name}")))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `ms_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ms_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| match read_str(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiClient {
            inner: MediaShareClient::new(&url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `ms_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ms_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a media listing request for `start`/`limit`.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_list_media(
    client: *const FfiClient,
    start: u32,
    limit: u32,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_list_media(MediaPage::new(start, limit)))))
}

/// Build a media listing request with the default page (start 10, limit 20).
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_list_media_default(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_list_media(MediaPage::default()))))
}

/// Build a detail request for one media file.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_get_media(client: *const FfiClient, file_id: u64) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_get_media(file_id))))
}

/// Build a login request. Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_login(
    client: *const FfiClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let credentials = Credentials {
            username: read_str(username)?,
            password: read_str(password)?,
        };
        Some(c.build_login(&credentials))
    })
}

/// Build a current-user request authenticated with `token`.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_get_user_by_token(
    client: *const FfiClient,
    token: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_get_user_by_token(&read_str(token)?))))
}

/// Build a registration request. `full_name` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_create_user(
    client: *const FfiClient,
    username: *const c_char,
    password: *const c_char,
    email: *const c_char,
    full_name: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let input = NewUser {
            username: read_str(username)?,
            password: read_str(password)?,
            email: read_str(email)?,
            full_name: read_str(full_name),
        };
        Some(c.build_create_user(&input))
    })
}

/// Build a profile update. Null fields are left out of the body; an empty
/// `password` keeps the current password and an empty `full_name` clears it.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_update_user(
    client: *const FfiClient,
    token: *const c_char,
    username: *const c_char,
    password: *const c_char,
    email: *const c_char,
    full_name: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let token = read_str(token)?;
        let input = UserUpdate {
            username: read_str(username),
            password: read_str(password).filter(|p| !p.is_empty()),
            email: read_str(email),
            full_name: read_str(full_name).map(|n| n.trim().to_string()),
        };
        Some(c.build_update_user(&input, &token))
    })
}

/// Build a username availability check.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_check_username(
    client: *const FfiClient,
    username: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_check_username(&read_str(username)?))))
}

/// Build a tag creation request authenticated with `token`.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_create_tag(
    client: *const FfiClient,
    token: *const c_char,
    file_id: u64,
    tag: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| {
        let token = read_str(token)?;
        let input = NewTag {
            file_id,
            tag: read_str(tag)?,
        };
        Some(c.build_create_tag(&input, &token))
    })
}

/// Build a files-by-tag query.
#[unsafe(no_mangle)]
pub extern "C" fn ms_build_files_by_tag(
    client: *const FfiClient,
    tag: *const c_char,
) -> *mut FfiHttpRequest {
    build_with(client, |c| Some(Ok(c.build_files_by_tag(&read_str(tag)?))))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Parse a media listing. `data_tag = FileIds` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_list_media(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_list_media", client, response, |c, resp| {
        match c.parse_list_media(resp) {
            Ok(listing) => FfiResult::ok_file_ids(listing),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a media detail response. `data_tag = Media` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_get_media(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_get_media", client, response, |c, resp| {
        match c.parse_get_media(resp) {
            Ok(item) => FfiResult::ok_media(item),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a login response. `data_tag = Session` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_login(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_login", client, response, |c, resp| {
        match c.parse_login(resp) {
            Ok(login) => FfiResult::ok_session(login),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a current-user response. `data_tag = User` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_get_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_get_user", client, response, |c, resp| {
        match c.parse_get_user(resp) {
            Ok(user) => FfiResult::ok_user(user),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a registration response. `data_tag = Created` (user id) on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_create_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_create_user", client, response, |c, resp| {
        match c.parse_create_user(resp) {
            Ok(created) => FfiResult::ok_created(created.message, created.user_id),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a profile update response. `data_tag = Message` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_update_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_update_user", client, response, |c, resp| {
        match c.parse_update_user(resp) {
            Ok(done) => FfiResult::ok_message(done.message),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a username check. `data_tag = Availability` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_check_username(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_check_username", client, response, |c, resp| {
        match c.parse_check_username(resp) {
            Ok(available) => FfiResult::ok_availability(available),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a tag creation response. `data_tag = Created` (tag id) on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_create_tag(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_create_tag", client, response, |c, resp| {
        match c.parse_create_tag(resp) {
            Ok(created) => FfiResult::ok_created(created.message, created.tag_id),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

/// Parse a files-by-tag response. `data_tag = MediaList` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ms_parse_files_by_tag(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("ms_parse_files_by_tag", client, response, |c, resp| {
        match c.parse_files_by_tag(resp) {
            Ok(files) => FfiResult::ok_tagged_files(files),
            Err(e) => FfiResult::from_error(e),
        }
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `ms_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ms_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        for h in unsafe { reclaim_slice(req.headers, req.headers_len) }.iter() {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    });
}

/// Free an `FfiResult` returned by any `ms_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn ms_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        let data = result.data;
        match result.data_tag {
            FfiDataTag::None => {}
            FfiDataTag::Session => {
                let session = unsafe { Box::from_raw(data as *mut FfiSession) };
                free_c_string(session.message);
                free_c_string(session.token);
                session.user.free_fields();
            }
            FfiDataTag::User => {
                unsafe { Box::from_raw(data as *mut FfiUser) }.free_fields();
            }
            FfiDataTag::Created => {
                free_c_string(unsafe { Box::from_raw(data as *mut FfiCreated) }.message);
            }
            FfiDataTag::Message => {
                free_c_string(unsafe { Box::from_raw(data as *mut FfiMessage) }.message);
            }
            FfiDataTag::Availability => {
                drop(unsafe { Box::from_raw(data as *mut FfiAvailability) });
            }
            FfiDataTag::FileIds => {
                let list = unsafe { Box::from_raw(data as *mut FfiFileIdList) };
                drop(unsafe { reclaim_slice(list.ids, list.len) });
            }
            FfiDataTag::Media => {
                unsafe { Box::from_raw(data as *mut FfiMediaItem) }.free_fields();
            }
            FfiDataTag::MediaList => {
                let list = unsafe { Box::from_raw(data as *mut FfiMediaList) };
                for item in unsafe { reclaim_slice(list.items, list.len) }.iter() {
                    item.free_fields();
                }
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ms_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
