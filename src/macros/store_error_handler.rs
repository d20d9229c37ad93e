/// unwrap a store result, on failure log it and return the default value
/// of the caller's return type from the enclosing function
macro_rules! store_or_default {
    ( $data:expr, $target:expr, $type_str:expr) => {
        match $data {
            Ok(e) => e,
            Err(error) => {
                error!(target:$target, "Error getting {}. (error: {})", $type_str, error);
                return Default::default();
            }
        }
    }
}

pub(crate) use store_or_default;
