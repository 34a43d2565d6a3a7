//! Value label rendering
//!
//! Labels use printf-style templates. Only integer directives are
//! meaningful for a seek bar: `%d` (or `%i`) with optional `-`, `+`,
//! space and `0` flags and a width, plus `%%` for a literal percent sign.
//! Any other directive is copied through unchanged.

/// Render `value` through `template`
///
/// ```
/// use preference::format_value;
///
/// assert_eq!(format_value("%d", 42), "42");
/// assert_eq!(format_value("%03d%%", 7), "007%");
/// assert_eq!(format_value("%s left", 3), "%s left");
/// ```
pub fn format_value(template: &str, value: i32) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let directive = &rest[start..];

        match Directive::parse(directive) {
            Some((Directive::Percent, len)) => {
                out.push('%');
                rest = &directive[len..];
            }
            Some((Directive::Integer(spec), len)) => {
                spec.render(value, &mut out);
                rest = &directive[len..];
            }
            None => {
                out.push('%');
                rest = &directive[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

enum Directive {
    Percent,
    Integer(IntegerSpec),
}

#[derive(Default)]
struct IntegerSpec {
    left_align: bool,
    plus: bool,
    space: bool,
    zero_pad: bool,
    width: usize,
}

impl Directive {
    /// Parse the directive at the start of `s` (which begins with `%`),
    /// returning it with its byte length.
    fn parse(s: &str) -> Option<(Directive, usize)> {
        let bytes = s.as_bytes();
        if bytes.get(1) == Some(&b'%') {
            return Some((Directive::Percent, 2));
        }

        let mut spec = IntegerSpec::default();
        let mut i = 1;
        while let Some(&b) = bytes.get(i) {
            match b {
                b'-' => spec.left_align = true,
                b'+' => spec.plus = true,
                b' ' => spec.space = true,
                b'0' => spec.zero_pad = true,
                _ => break,
            }
            i += 1;
        }

        while let Some(&b) = bytes.get(i) {
            if !b.is_ascii_digit() {
                break;
            }
            spec.width = spec.width.saturating_mul(10).saturating_add(usize::from(b - b'0'));
            i += 1;
        }

        match bytes.get(i) {
            Some(b'd') | Some(b'i') => Some((Directive::Integer(spec), i + 1)),
            _ => None,
        }
    }
}

impl IntegerSpec {
    fn render(&self, value: i32, out: &mut String) {
        let digits = value.unsigned_abs().to_string();
        let sign = if value < 0 {
            "-"
        } else if self.plus {
            "+"
        } else if self.space {
            " "
        } else {
            ""
        };

        let pad = self.width.saturating_sub(sign.len() + digits.len());
        if self.left_align {
            out.push_str(sign);
            out.push_str(&digits);
            out.extend(std::iter::repeat(' ').take(pad));
        } else if self.zero_pad {
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(pad));
            out.push_str(&digits);
        } else {
            out.extend(std::iter::repeat(' ').take(pad));
            out.push_str(sign);
            out.push_str(&digits);
        }
    }
}
