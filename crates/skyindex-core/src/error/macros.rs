//! Error macros for skyindex

/// Macro for creating invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::SkyError::invalid_value($context, $value))
    };
}

/// Macro for creating usage errors
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::SkyError::UsageError($msg.to_string()))
    };
}

/// Macro for creating empty identifier errors
#[macro_export]
macro_rules! bail_empty {
    ($context:expr) => {
        return Err($crate::error::SkyError::EmptyIdentifier {
            context: $context.to_string(),
        })
    };
}

/// Macro for mapping model file errors
#[macro_export]
macro_rules! map_model_err {
    ($path:expr, $error:expr) => {
        $crate::error::SkyError::model($path, $error)
    };
}
