use crate::model::{ControlImplementation, PropertyName, property::find_property};

/// Returns the short name of the framework a control implementation belongs
/// to, if one can be determined.
///
/// An explicit `Framework_Short_Name` property wins. Otherwise the source is
/// read as a workspace path of the form `$MODEL/$MODEL_ID/$MODEL.json` and
/// the model ID is used.
///
/// ```
/// use compliance_rules::{classify_framework, model::ControlImplementation};
///
/// let implementation = ControlImplementation {
///     source: "profiles/cis/profile.json".to_string(),
///     ..ControlImplementation::default()
/// };
/// assert_eq!(classify_framework(&implementation).as_deref(), Some("cis"));
/// ```
#[must_use]
pub fn classify_framework(control_implementation: &ControlImplementation) -> Option<String> {
    const EXPECTED_SEGMENTS: usize = 3;
    const MODEL_ID_INDEX: usize = 1;
    const FILENAME_INDEX: usize = 2;

    if let Some(property) =
        find_property(PropertyName::FrameworkShortName, &control_implementation.props)
    {
        return Some(property.value.clone());
    }

    let cleaned = clean_path(&control_implementation.source);
    let segments: Vec<&str> = cleaned.split('/').collect();
    if segments.len() == EXPECTED_SEGMENTS && segments[FILENAME_INDEX].ends_with(".json") {
        return Some(segments[MODEL_ID_INDEX].to_string());
    }

    None
}

/// Lexically normalizes a slash-separated path.
///
/// Repeated separators and `.` segments are dropped, and `..` removes the
/// segment before it where there is one. An empty result becomes `.`.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            segment => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
