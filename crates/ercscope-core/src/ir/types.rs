//! Canonical type strings.
//!
//! Interface conformance compares ABI shapes, so compiler type strings are
//! reduced to the form that appears in a function selector.

const DATA_LOCATIONS: &[&str] = &["memory", "storage", "calldata", "ref", "pointer", "slice"];

pub fn canonical_type(raw: &str) -> String {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while words.len() > 1 && words.last().is_some_and(|w| DATA_LOCATIONS.contains(w)) {
        words.pop();
    }

    let ty = match words.as_slice() {
        [] => return String::new(),
        [single] => single.to_string(),
        [kind, rest] => {
            // Array suffixes bind to the second word: `contract IERC20[2][]`.
            let (name, suffix) = split_array_suffix(rest);
            match (*kind, name) {
                ("address", "payable") | ("contract" | "interface", _) => format!("address{suffix}"),
                ("enum", _) => format!("uint8{suffix}"),
                ("struct", _) => rest.to_string(),
                _ => words.join(" "),
            }
        }
        _ => words.join(" "),
    };

    canonical_elementary(&ty)
}

fn split_array_suffix(ty: &str) -> (&str, &str) {
    match ty.find('[') {
        Some(i) => ty.split_at(i),
        None => (ty, ""),
    }
}

/// Expands aliases (`uint`, `int`, `byte`) including inside array suffixes.
fn canonical_elementary(ty: &str) -> String {
    let (base, suffix) = split_array_suffix(ty);
    let base = match base {
        "uint" => "uint256",
        "int" => "int256",
        "byte" => "bytes1",
        other => other,
    };
    format!("{base}{suffix}")
}
