#![allow(clippy::missing_safety_doc)]

//! C ABI for hosts that embed the consensus card.
//!
//! Configuration and state snapshots go in as UTF-8 JSON; consensus results
//! and view models come back as owned JSON byte buffers that the caller must
//! release with `weather_card_bytes_free`.

use std::ptr;

use log::{error, warn};
use serde_json::Value;

use weather_consensus_card::{CardError, ConsensusCard};

/// FFI ABI version for weather_consensus_ffi.
///
/// Bump this when any `#[repr(C)]` struct layout or exported function signature changes.
pub const WEATHER_CARD_FFI_VERSION: u32 = 1;

pub const WC_OK: i32 = 0;
pub const WC_ERR_NULL: i32 = -1;
pub const WC_ERR_UTF8: i32 = -2;
pub const WC_ERR_JSON: i32 = -3;
pub const WC_ERR_CONFIG: i32 = -4;
pub const WC_ERR_STATE: i32 = -5;

#[no_mangle]
pub extern "C" fn weather_card_ffi_version() -> u32 {
    WEATHER_CARD_FFI_VERSION
}

/// Opaque handle exposed over FFI.
#[repr(C)]
pub struct WcCard {
    inner: ConsensusCard,
}

/// FFI string view (UTF-8 bytes).
#[repr(C)]
#[derive(Clone, Copy)]
pub struct WcStr {
    pub ptr: *const u8,
    pub len: usize,
}

impl WcStr {
    unsafe fn as_str(&self) -> Option<&str> {
        if self.ptr.is_null() {
            return None;
        }
        let bytes = std::slice::from_raw_parts(self.ptr, self.len);
        std::str::from_utf8(bytes).ok()
    }
}

/// Owned byte buffer (JSON text, not NUL-terminated).
#[repr(C)]
pub struct WcBytes {
    pub ptr: *mut u8,
    pub len: usize,
}

impl WcBytes {
    fn empty() -> Self {
        WcBytes { ptr: ptr::null_mut(), len: 0 }
    }

    fn from_vec(buf: Vec<u8>) -> Self {
        let mut boxed = buf.into_boxed_slice();
        let ptr = boxed.as_mut_ptr();
        let len = boxed.len();
        // freed by weather_card_bytes_free
        std::mem::forget(boxed);
        WcBytes { ptr, len }
    }
}

fn json_bytes(res: serde_json::Result<Vec<u8>>) -> WcBytes {
    match res {
        Ok(buf) => WcBytes::from_vec(buf),
        Err(e) => {
            error!("failed to encode card output: {e}");
            WcBytes::empty()
        }
    }
}

#[no_mangle]
pub extern "C" fn weather_card_new() -> *mut WcCard {
    let handle = WcCard {
        inner: ConsensusCard::new(),
    };
    Box::into_raw(Box::new(handle))
}

#[no_mangle]
pub unsafe extern "C" fn weather_card_free(h: *mut WcCard) {
    if !h.is_null() {
        drop(Box::from_raw(h));
    }
}

/// Apply a JSON configuration. Returns `WC_OK` or a negative error code;
/// on error the previous configuration stays in place.
#[no_mangle]
pub unsafe extern "C" fn weather_card_set_config(h: *mut WcCard, json: WcStr) -> i32 {
    if h.is_null() || json.ptr.is_null() {
        return WC_ERR_NULL;
    }
    let handle = &mut *h;
    let text = match json.as_str() {
        Some(s) => s,
        None => return WC_ERR_UTF8,
    };
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!("card configuration is not JSON: {e}");
            return WC_ERR_JSON;
        }
    };

    match handle.inner.set_config(&value) {
        Ok(()) => WC_OK,
        Err(_) => WC_ERR_CONFIG,
    }
}

/// Push a JSON state snapshot (`{entity_id: {state, attributes}}`).
#[no_mangle]
pub unsafe extern "C" fn weather_card_set_state(h: *mut WcCard, json: WcStr) -> i32 {
    if h.is_null() || json.ptr.is_null() {
        return WC_ERR_NULL;
    }
    let handle = &mut *h;
    let text = match json.as_str() {
        Some(s) => s,
        None => return WC_ERR_UTF8,
    };

    match handle.inner.set_hass_json(text) {
        Ok(()) => WC_OK,
        Err(CardError::State(e)) => {
            warn!("rejecting state snapshot: {e}");
            WC_ERR_STATE
        }
        Err(CardError::Config(_)) => WC_ERR_CONFIG,
    }
}

/// Current consensus as JSON, or the text `null` when there is none.
#[no_mangle]
pub unsafe extern "C" fn weather_card_consensus_json(h: *const WcCard) -> WcBytes {
    if h.is_null() {
        return WcBytes::empty();
    }
    let handle = &*h;
    json_bytes(serde_json::to_vec(&handle.inner.consensus()))
}

/// Current view model as JSON (`{"kind": "unavailable" | "no_data" | "ready", ...}`).
#[no_mangle]
pub unsafe extern "C" fn weather_card_view_json(h: *const WcCard) -> WcBytes {
    if h.is_null() {
        return WcBytes::empty();
    }
    let handle = &*h;
    json_bytes(serde_json::to_vec(&handle.inner.view()))
}

/// Effective configuration as JSON, `null` before the first successful set.
#[no_mangle]
pub unsafe extern "C" fn weather_card_config_json(h: *const WcCard) -> WcBytes {
    if h.is_null() {
        return WcBytes::empty();
    }
    let handle = &*h;
    json_bytes(serde_json::to_vec(&handle.inner.config()))
}

#[no_mangle]
pub extern "C" fn weather_card_stub_config_json() -> WcBytes {
    json_bytes(serde_json::to_vec(&ConsensusCard::stub_config()))
}

#[no_mangle]
pub unsafe extern "C" fn weather_card_size(h: *const WcCard) -> u32 {
    if h.is_null() {
        return weather_consensus_card::CARD_SIZE;
    }
    (*h).inner.card_size()
}

#[no_mangle]
pub unsafe extern "C" fn weather_card_bytes_free(b: WcBytes) {
    if !b.ptr.is_null() {
        let slice_ptr = std::ptr::slice_from_raw_parts_mut(b.ptr, b.len);
        drop(Box::from_raw(slice_ptr));
    }
}
