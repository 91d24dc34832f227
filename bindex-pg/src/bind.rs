//! Parameter binding.
//!
//! Every parameter is sent as text and the server coerces it to the
//! placeholder's declared type, which is how a string-only parameter file
//! can drive queries over dates, numbers and the like.

use bytes::BytesMut;
use postgres_types::{to_sql_checked, Format, IsNull, ToSql, Type};
use std::error::Error;

/// A parameter value sent in text format regardless of the placeholder type.
#[derive(Debug, Clone, Copy)]
pub struct TextParam<'a>(pub &'a str);

impl ToSql for TextParam<'_> {
    fn to_sql(&self, _ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

/// Borrow each value of a tuple as a text parameter.
pub fn text_params(values: &[String]) -> Vec<TextParam<'_>> {
    values.iter().map(|v| TextParam(v.as_str())).collect()
}
