//! Format output dispatch helpers
//!
//! Provides macros to eliminate repetitive format match blocks.

/// Dispatch output by format; the json branch returns a Result and the
/// human branch returns ().
///
/// # Examples
///
/// ```rust,ignore
/// output_by_format_result!(cli.format,
///     json => print_json(&results),
///     human => { print_entries(&results); }
/// )
/// ```
#[macro_export]
macro_rules! output_by_format_result {
    ($format:expr, json => $json:expr, human => $human:block) => {
        match $format {
            $crate::cli::OutputFormat::Json => $json,
            $crate::cli::OutputFormat::Human => {
                $human;
                Ok(())
            }
        }
    };
}

pub use crate::output_by_format_result;

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> skyindex_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
