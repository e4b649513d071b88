//! Path template matching.
//!
//! Matches runtime request paths against OpenAPI path templates such as
//! `/mock/users/{id}` or `/mock/files/{name}.json`. A parameter matches a
//! non-empty run of characters inside a single segment; it never spans a
//! `/`.

/// A compiled path template.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    segments: Vec<TemplateSegment>,
}

#[derive(Debug, Clone, PartialEq)]
enum TemplateSegment {
    Literal(String),
    Pattern(Vec<Piece>),
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    Param,
}

impl PathTemplate {
    /// Compile a template. Unbalanced braces are treated literally.
    pub fn parse(template: &str) -> Self {
        let segments = template
            .split('/')
            .map(|segment| {
                if segment.contains('{') {
                    let pieces = parse_pieces(segment);
                    if pieces.iter().any(|p| matches!(p, Piece::Param)) {
                        return TemplateSegment::Pattern(pieces);
                    }
                }
                TemplateSegment::Literal(segment.to_string())
            })
            .collect();

        Self { segments }
    }

    /// Whether a request path matches this template.
    pub fn matches(&self, path: &str) -> bool {
        let mut parts = path.split('/');

        for segment in &self.segments {
            let Some(part) = parts.next() else {
                return false;
            };
            let matched = match segment {
                TemplateSegment::Literal(lit) => lit == part,
                TemplateSegment::Pattern(pieces) => match_pieces(pieces, part),
            };
            if !matched {
                return false;
            }
        }

        // Must consume entire path
        parts.next().is_none()
    }

    /// Number of fully literal segments. Concrete paths such as `/users/me`
    /// win over templated ones such as `/users/{id}`.
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, TemplateSegment::Literal(_)))
            .count()
    }
}

fn parse_pieces(segment: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut in_param = false;

    for ch in segment.chars() {
        if ch == '{' && !in_param {
            if !current.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut current)));
            }
            in_param = true;
        } else if ch == '}' && in_param {
            // Parameter names are irrelevant for matching
            current.clear();
            pieces.push(Piece::Param);
            in_param = false;
        } else {
            current.push(ch);
        }
    }

    if in_param {
        // Unterminated parameter: keep the brace as literal text.
        current.insert(0, '{');
    }
    if !current.is_empty() {
        pieces.push(Piece::Literal(current));
    }

    pieces
}

/// Match a segment against its pieces. A parameter takes a non-empty run of
/// characters; every split point is tried, so `{name}.json` matches
/// `a.json.json` with `name = a.json`.
fn match_pieces(pieces: &[Piece], part: &str) -> bool {
    match pieces.split_first() {
        None => part.is_empty(),
        Some((Piece::Literal(lit), rest)) => part
            .strip_prefix(lit.as_str())
            .is_some_and(|remaining| match_pieces(rest, remaining)),
        Some((Piece::Param, [])) => !part.is_empty(),
        Some((Piece::Param, rest)) => part
            .char_indices()
            .map(|(i, ch)| i + ch.len_utf8())
            .any(|end| match_pieces(rest, &part[end..])),
    }
}
