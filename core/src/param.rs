//! Textual rendering of path segments, query values and header values.
//!
//! Every value placed in a URL or header goes through `ParamValue`. Absent
//! values (`None`, JSON `null`) render as an empty string so an optional
//! filter or segment never aborts request construction.

/// A value that can be rendered into a URL or header.
pub trait ParamValue {
    fn to_param(&self) -> String;
}

impl ParamValue for str {
    fn to_param(&self) -> String {
        self.to_string()
    }
}

impl ParamValue for String {
    fn to_param(&self) -> String {
        self.clone()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for &T {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

impl<T: ParamValue + ?Sized> ParamValue for Box<T> {
    fn to_param(&self) -> String {
        (**self).to_param()
    }
}

impl<T: ParamValue> ParamValue for Option<T> {
    fn to_param(&self) -> String {
        match self {
            Some(value) => value.to_param(),
            None => String::new(),
        }
    }
}

impl ParamValue for serde_json::Value {
    fn to_param(&self) -> String {
        match self {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

macro_rules! display_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ParamValue for $ty {
                fn to_param(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_param!(bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_render_verbatim() {
        assert_eq!("abc".to_param(), "abc");
        assert_eq!(String::from("a b").to_param(), "a b");
    }

    #[test]
    fn numbers_and_booleans_use_display() {
        assert_eq!(42_i64.to_param(), "42");
        assert_eq!(50.0_f64.to_param(), "50");
        assert_eq!(1.5_f32.to_param(), "1.5");
        assert_eq!(true.to_param(), "true");
    }

    #[test]
    fn optional_values_unwrap_or_render_empty() {
        assert_eq!(Some(7_u32).to_param(), "7");
        assert_eq!(None::<u32>.to_param(), "");
        assert_eq!(Some(Some("x")).to_param(), "x");
    }

    #[test]
    fn references_render_the_pointee() {
        let id = String::from("pref-1");
        let by_ref: &String = &id;
        assert_eq!(by_ref.to_param(), "pref-1");
        assert_eq!(Box::new(3_u8).to_param(), "3");
    }

    #[test]
    fn json_values_render_without_quotes() {
        assert_eq!(json!("ref-1").to_param(), "ref-1");
        assert_eq!(json!(null).to_param(), "");
        assert_eq!(json!(12).to_param(), "12");
        assert_eq!(json!(false).to_param(), "false");
    }
}
