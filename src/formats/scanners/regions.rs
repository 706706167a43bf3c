//! Locating code inside template-like files.
//!
//! PHP, Blade and Twig files are mostly markup; only some regions hold code
//! the call finder should see. `mask` blanks everything else while keeping
//! newlines, so token line numbers still match the original file.

/// Byte ranges `[start, end)` of code regions, in order.
pub type Regions = Vec<(usize, usize)>;

pub fn mask(source: &str, regions: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut regions = regions.iter().peekable();
    for (i, c) in source.char_indices() {
        while regions.peek().is_some_and(|(_, end)| *end <= i) {
            regions.next();
        }
        let inside = regions
            .peek()
            .is_some_and(|(start, end)| *start <= i && i < *end);
        if inside || c == '\n' {
            out.push(c);
        } else {
            out.push(' ');
        }
    }
    out
}

/// `<?php ... ?>`, `<?= ... ?>` and `<? ... ?>` blocks. An unclosed block
/// runs to the end of the file.
pub fn php_regions(source: &str) -> Regions {
    let mut regions = Vec::new();
    let mut pos = 0;
    while let Some(found) = source[pos..].find("<?") {
        let open = pos + found;
        let rest = &source[open..];
        let code_start = if rest.starts_with("<?php") {
            open + 5
        } else if rest.starts_with("<?=") {
            open + 3
        } else {
            open + 2
        };
        let end = source[code_start..]
            .find("?>")
            .map_or(source.len(), |i| code_start + i);
        regions.push((code_start, end));
        pos = (end + 2).min(source.len());
        if end >= source.len() {
            break;
        }
    }
    regions
}

/// Blade echoes, raw echoes, `@php` blocks, `@directive(...)` calls and
/// plain PHP blocks. `{{-- --}}` comments are skipped.
pub fn blade_regions(source: &str) -> Regions {
    let mut regions = Vec::new();
    let bytes = source.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let rest = &source[pos..];
        if rest.starts_with("{{--") {
            pos = skip_past(source, pos + 4, "--}}");
        } else if rest.starts_with("{{") {
            pos = push_delimited(source, &mut regions, pos + 2, "}}");
        } else if rest.starts_with("{!!") {
            pos = push_delimited(source, &mut regions, pos + 3, "!!}");
        } else if rest.starts_with("<?php") {
            pos = push_delimited(source, &mut regions, pos + 5, "?>");
        } else if rest.starts_with("@php") && !rest[4..].starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '(') {
            pos = push_delimited(source, &mut regions, pos + 4, "@endphp");
        } else if bytes[pos] == b'@' {
            match directive_call(source, pos) {
                Some(end) => {
                    regions.push((pos, end));
                    pos = end;
                }
                None => pos += 1,
            }
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    regions
}

/// Twig `{{ }}` and `{% %}` blocks. `{# #}` comments are skipped.
pub fn twig_regions(source: &str) -> Regions {
    let mut regions = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        if rest.starts_with("{#") {
            pos = skip_past(source, pos + 2, "#}");
        } else if rest.starts_with("{{") {
            pos = push_delimited(source, &mut regions, pos + 2, "}}");
        } else if rest.starts_with("{%") {
            pos = push_delimited(source, &mut regions, pos + 2, "%}");
        } else {
            pos += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    regions
}

fn skip_past(source: &str, from: usize, close: &str) -> usize {
    source[from..]
        .find(close)
        .map_or(source.len(), |i| from + i + close.len())
}

fn push_delimited(source: &str, regions: &mut Regions, from: usize, close: &str) -> usize {
    let end = source[from..].find(close).map_or(source.len(), |i| from + i);
    regions.push((from, end));
    (end + close.len()).min(source.len())
}

/// `@name(` ... matching `)`; returns the end offset (exclusive).
fn directive_call(source: &str, at: usize) -> Option<usize> {
    let name_len = source[at + 1..]
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(source.len() - at - 1);
    if name_len == 0 {
        return None;
    }
    let open = at + 1 + name_len;
    if !source[open..].starts_with('(') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in source[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
