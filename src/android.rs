//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::compute_span_json;

/// Compute a JSON span document and return the JSON report.
///
/// Called from Kotlin as:
///   external fun computeSpan(json: String): String?
#[no_mangle]
pub extern "system" fn Java_com_engravelib_EngraveLib_computeSpan(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let json_str: String = match env.get_string(&json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };

    match compute_span_json(&json_str) {
        Ok(report) => match env.new_string(&report) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(_) => std::ptr::null_mut(),
    }
}
