use colmap_api::{Representation, SourceError, TypeDescriptor};

// ═══════════════════════════════════════════════════════════════
//  Record splitting (RFC 4180 quoting, single line)
// ═══════════════════════════════════════════════════════════════

/// Split one line into fields.
///
/// With `quoting`, a field starting with `"` runs until the closing quote
/// and `""` inside it is a literal quote. Multi-line quoted fields are not
/// supported.
pub(crate) fn split_record(line: &str, delimiter: char, quoting: bool) -> Vec<String> {
    if !quoting {
        return line.split(delimiter).map(str::to_string).collect();
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
        } else if c == '"' && field.is_empty() {
            quoted = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);
    fields
}

pub(crate) fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

pub(crate) fn parse_delimiter(s: &str) -> Result<char, SourceError> {
    let mut chars = s.chars();
    match (s, chars.next(), chars.next()) {
        ("\\t", _, _) => Ok('\t'),
        (_, Some(c), None) if c != '"' && c != '\n' && c != '\r' => Ok(c),
        _ => Err(SourceError::logic(format!(
            "CSV: delimiter must be a single character other than a quote or newline, got {s:?}"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Header columns: `name[:TYPE[(a[,b])]]`
// ═══════════════════════════════════════════════════════════════

const DECIMAL_TYPES: &[&str] = &["NUMERIC", "DECIMAL", "DEC"];

/// Parse one header field into a column descriptor.
///
/// `price:DECIMAL(10,2)` → type `DECIMAL`, precision 10, scale 2.
/// `code:VARCHAR(16)` → type `VARCHAR`, length 16.
/// `note` → type `TEXT`.
///
/// CSV has no typed values, so the driver scan type is always text.
pub(crate) fn parse_column(field: &str, nullable: bool) -> Result<TypeDescriptor, SourceError> {
    let (name, declared) = match field.split_once(':') {
        Some((name, declared)) => (name.trim(), declared.trim()),
        None => (field.trim(), "TEXT"),
    };
    if name.is_empty() {
        return Err(SourceError::metadata(format!("CSV: empty column name in {field:?}")));
    }

    let (type_name, args) = match declared.split_once('(') {
        Some((type_name, rest)) => {
            let inner = rest.strip_suffix(')').ok_or_else(|| {
                SourceError::metadata(format!("CSV: unclosed type arguments in {field:?}"))
            })?;
            let args = inner
                .split(',')
                .map(|a| a.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| SourceError::metadata(format!("CSV: bad type argument in {field:?}: {e}")))?;
            (type_name.trim(), args)
        }
        None => (declared, Vec::new()),
    };
    let type_name = type_name.to_ascii_uppercase();

    let mut descriptor =
        TypeDescriptor::new(name, type_name.as_str(), Representation::Text).with_nullable(nullable);
    let is_decimal = DECIMAL_TYPES.contains(&type_name.as_str());
    descriptor = match (args.as_slice(), is_decimal) {
        ([], _) => descriptor,
        ([precision], true) => descriptor.with_decimal_size(*precision, 0),
        ([length], false) => descriptor.with_length(*length),
        ([precision, scale], _) => descriptor.with_decimal_size(*precision, *scale),
        _ => {
            return Err(SourceError::metadata(format!(
                "CSV: too many type arguments in {field:?}"
            )));
        }
    };
    Ok(descriptor)
}
