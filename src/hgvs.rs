//! HGVS protein notation between one-letter and three-letter forms.
//!
//! `p.L858R` ↔ `p.Leu858Arg`, `p.G12fs*7` ↔ `p.Gly12fsTer7`. Only the amino
//! acid codes change; positions, `del`, `ins`, `dup`, `fs` and the `p.`
//! prefix are copied through.

use crate::codon::{single_letter, three_letter};

/// The one-letter code for a three-letter code at `chars[i..]`, if any.
///
/// Codes must be capitalized (`Leu`), so `del` or `ins` never match.
fn code_at(chars: &[char], i: usize) -> Option<char> {
    let code = chars.get(i..i + 3)?;
    if !code[0].is_ascii_uppercase() || !code[1..].iter().all(char::is_ascii_lowercase) {
        return None;
    }
    single_letter(&code.iter().collect::<String>())
}

/// One-letter codes to three-letter codes.
///
/// Input that is already in the long form is left as it is.
pub fn to_long(hgvs: &str) -> String {
    let (prefix, body) = match hgvs.strip_prefix("p.") {
        Some(body) => ("p.", body),
        None => ("", hgvs),
    };

    let chars: Vec<char> = body.chars().collect();
    let mut out = String::from(prefix);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if code_at(&chars, i).is_some() {
            out.extend(&chars[i..i + 3]);
            i += 3;
            continue;
        }
        match three_letter(c) {
            Some(code) if c.is_ascii_uppercase() || c == '*' => out.push_str(code),
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

/// Three-letter codes to one-letter codes.
pub fn to_short(hgvs: &str) -> String {
    let chars: Vec<char> = hgvs.chars().collect();
    let mut out = String::with_capacity(hgvs.len());
    let mut i = 0;
    while i < chars.len() {
        match code_at(&chars, i) {
            Some(single) => {
                out.push(single);
                i += 3;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

fn is_long_form(hgvs: &str) -> bool {
    let chars: Vec<char> = hgvs.chars().collect();
    (0..chars.len()).any(|i| code_at(&chars, i).is_some())
}

/// Convert in whichever direction the input needs.
pub fn convert(hgvs: &str) -> String {
    if is_long_form(hgvs) {
        to_short(hgvs)
    } else {
        to_long(hgvs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_to_long() {
        assert_eq!(to_long("p.L858R"), "p.Leu858Arg");
        assert_eq!(to_long("p.E746_A750del"), "p.Glu746_Ala750del");
        assert_eq!(to_long("p.G12fs*7"), "p.Gly12fsTer7");
        assert_eq!(to_long("p.R248*"), "p.Arg248Ter");
        assert_eq!(to_long("V600E"), "Val600Glu");
    }

    #[test]
    fn test_long_input_unchanged() {
        assert_eq!(to_long("p.Leu858Arg"), "p.Leu858Arg");
    }

    #[test]
    fn test_long_to_short() {
        assert_eq!(to_short("p.Leu858Arg"), "p.L858R");
        assert_eq!(to_short("p.Gly12fsTer7"), "p.G12fs*7");
        assert_eq!(to_short("p.Glu746_Ala750del"), "p.E746_A750del");
    }

    #[test]
    fn test_convert_picks_direction() {
        assert_eq!(convert("p.T790M"), "p.Thr790Met");
        assert_eq!(convert("p.Thr790Met"), "p.T790M");
    }
}
