//! Layer-constant propagation.
//!
//! The schema announces its version in a `// LAYER <n>` comment
//! (`tl_parse::extract_layer`); that number is propagated into a persisted
//! constant elsewhere, leaving every other byte of the destination
//! untouched.

/// Replace the digits of the first case-insensitive `LAYER = <n>`
/// occurrence in `contents`.
///
/// Returns `None` when no such occurrence exists; the caller decides how
/// loudly to report that.
pub fn patch_layer(contents: &str, layer: u32) -> Option<String> {
    let bytes = contents.as_bytes();
    let lower = contents.to_ascii_lowercase();
    let mut search = 0;
    while let Some(found) = lower[search..].find("layer") {
        let start = search + found;
        let mut i = start + "layer".len();
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            search = start + "layer".len();
            continue;
        }
        i += 1;
        while bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        let digits_start = i;
        while bytes.get(i).is_some_and(|b| b.is_ascii_digit()) {
            i += 1;
        }
        if i == digits_start {
            search = start + "layer".len();
            continue;
        }

        let mut patched = String::with_capacity(contents.len());
        patched.push_str(&contents[..digits_start]);
        patched.push_str(&layer.to_string());
        patched.push_str(&contents[i..]);
        return Some(patched);
    }
    None
}
