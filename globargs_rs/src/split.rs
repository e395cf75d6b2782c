//! Comma-separated value expansion.

use std::rc::Rc;

use crate::Value;

/// Split a value token on `,`.
///
/// The search for the next comma starts one character into the current
/// fragment, so a comma that opens a fragment belongs to it: `",a"` stays
/// whole and `"a,,b"` gives `["a", ",b"]`. A trailing comma leaves an empty
/// last fragment.
pub fn split_values(token: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0;

    loop {
        let rest = &token[start..];
        let skip = rest.chars().next().map_or(0, char::len_utf8);
        match rest[skip..].find(',') {
            Some(offset) => {
                let end = start + skip + offset;
                fragments.push(&token[start..end]);
                start = end + 1;
            }
            None => {
                fragments.push(rest);
                return fragments;
            }
        }
    }
}

/// Expand a value token into the values appended to an args collector.
///
/// A token without commas is returned as-is, sharing its storage. When it
/// splits, every fragment, the first included, is a new allocation (an
/// `Rc<str>` cannot point into another one) and is also recorded in
/// `scratch` so cleanup can account for it.
pub fn expand_value(token: &Value, scratch: &mut Vec<Value>) -> Vec<Value> {
    let fragments = split_values(token);
    if fragments.len() == 1 {
        return vec![Rc::clone(token)];
    }

    fragments
        .into_iter()
        .map(|fragment| {
            let owned: Value = Rc::from(fragment);
            scratch.push(Rc::clone(&owned));
            owned
        })
        .collect()
}
