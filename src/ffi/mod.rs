//! C ABI - the flat functions a host links against
//!
//! Design: every function is `#[no_mangle] extern "C"`, prefixed `wl_`, and
//! runs its body through `boundary` so that no panic or native error
//! escapes; failures land in the error channel.
//!
//! 1. Lifecycle (`wl_init`, `wl_cleanup`, `wl_free`, `wl_version`)
//! 2. Refcount hook and userdata (`refcount.rs`)
//! 3. Error channel (`error.rs`)
//! 4. Dispatch tables and override flags (`vtable.rs`)
//! 5. Object registry (`registry.rs`)
//! 6. Host-backed input streams (`stream.rs`)

use core::ffi::{c_char, c_void};

use crate::boundary;
use crate::config::{self, BridgeConfig};
use crate::logging::{self, debug, info, LogConfig};

mod error;
mod refcount;
mod registry;
mod stream;
mod vtable;

pub use error::{wl_clear_error, wl_fetch_error, wl_has_error, wl_set_error};
pub use refcount::{
    wl_install_adjust_refcount, wl_userdata_clone, wl_userdata_delete, wl_userdata_handle,
    wl_userdata_new,
};
pub use registry::{
    wl_registry_class_name, wl_registry_forget, wl_registry_give_ownership,
    wl_registry_is_host_owned, wl_registry_lookup, wl_registry_register,
    wl_registry_take_ownership,
};
pub use stream::{
    wl_input_stream_clone, wl_input_stream_delete, wl_input_stream_new, wl_input_stream_read,
    wl_install_input_stream_callbacks,
};
pub use vtable::{
    wl_clear_vflag, wl_has_vflag, wl_set_vflag, wl_set_vflags, wl_vtable_len, wl_vtable_lookup,
    wl_vtable_set_slot, wl_vtable_slots,
};

static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();

/// Load configuration (`WL_CONFIG`) and start logging. Call once at host
/// startup; later calls are no-ops. Returns false and sets an error when
/// the configuration file cannot be loaded.
#[no_mangle]
pub extern "C" fn wl_init() -> bool {
    boundary::entry(
        "wl_init",
        || {
            if !config::is_initialized() {
                // Losing a race to another initialiser is fine
                let _ = config::init(BridgeConfig::from_env()?);
            }

            let log_config = if std::env::var("WL_LOG_LEVEL").is_ok() {
                LogConfig::from_env()
            } else {
                LogConfig::from_settings(&config::get().logging)
            };
            logging::init_with_config(log_config);

            info!(version = env!("CARGO_PKG_VERSION"), "wrapper_lib initialized");
            Ok(true)
        },
        Ok,
    )
}

/// Flush logs before the host exits
#[no_mangle]
pub extern "C" fn wl_cleanup() {
    debug!("wrapper_lib shutting down");
    logging::shutdown();
}

/// Release memory this library handed to the host (strings, arrays)
///
/// # Safety
/// `ptr` must be null or come from this library.
#[no_mangle]
pub unsafe extern "C" fn wl_free(ptr: *mut c_void) {
    crate::convert::free_c(ptr);
}

/// Library version, static storage
#[no_mangle]
pub extern "C" fn wl_version() -> *const c_char {
    VERSION.as_ptr().cast()
}

#[cfg(test)]
mod tests;
