//! Well-known classifier codes.
//!
//! The backend stamps every response envelope with an integer classifier.
//! Only two values have a fixed meaning on the client side; every other
//! value is an opaque server-defined failure code surfaced to callers as-is.

/// Success. An envelope with this classifier and no payload means the call
/// went through but there is nothing to show.
pub const OK: i32 = 0;

/// The caller's session is no longer valid. Classified like any other
/// server failure; callers match on the code when they want to force a
/// fresh login.
pub const SESSION_EXPIRED: i32 = 3;

/// Whether a classifier denotes success at the envelope layer.
pub fn is_ok(code: i32) -> bool {
    code == OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_zero_is_ok() {
        assert!(is_ok(OK));
        assert!(!is_ok(SESSION_EXPIRED));
        assert!(!is_ok(-1));
        assert!(!is_ok(7));
    }
}
