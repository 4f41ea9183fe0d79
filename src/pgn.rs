use winnow::ascii::{digit1, space0, space1, till_line_ending};
use winnow::combinator::{alt, delimited, preceded, repeat, terminated};
use winnow::token::{none_of, one_of, take_until, take_while};
use winnow::Parser;
use winnow::Result as WinnowResult;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("invalid PGN: tag pair on line {0} is not terminated by ']'")]
    UnterminatedTag(usize),

    #[error("invalid PGN: tag pair on line {0} is malformed: {1}")]
    MalformedTag(usize, String),

    #[error("invalid PGN: comment starting on line {0} is not closed by '}}'")]
    UnterminatedComment(usize),

    #[error("invalid PGN: unbalanced variation parenthesis on line {0}")]
    UnbalancedVariation(usize),

    #[error("invalid PGN: unexpected {1:?} on line {0}")]
    UnexpectedCharacter(usize, char),
}

/// One game record: its tag pairs in file order, the SAN tokens of the main line and the
/// termination marker if one was given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<String>,
    pub result: Option<String>,
}

impl PgnGame {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(tag_name, _)| tag_name == name)
            .map(|(_, value)| value.as_str())
    }
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'s> {
    Tag(String, String),
    Comment,
    VariationStart,
    VariationEnd,
    Nag,
    MoveNumber,
    Result(&'s str),
    San(&'s str),
}

/// Splits `text` into game records. Comments, variations, NAGs and move numbers are dropped;
/// the remaining movetext tokens are returned verbatim for a SAN parser.
pub fn parse_games(text: &str) -> Result<Vec<PgnGame>, PgnError> {
    let mut games = Vec::new();
    let mut game = PgnGame::default();
    // line of every '(' not closed yet
    let mut open_variations: Vec<usize> = Vec::new();
    let mut input = text;

    loop {
        input = input.trim_start();
        let Some(first) = input.chars().next() else {
            break;
        };
        let line = line_of(text, input);
        let start = input;

        let token = parse_token
            .parse_next(&mut input)
            .map_err(|_| token_error(start, first, line))?;

        match token {
            Token::Tag(name, value) => {
                if let Some(&open_line) = open_variations.last() {
                    return Err(PgnError::UnbalancedVariation(open_line));
                }
                // Games without a result are only ended by the next tag section.
                if !game.moves.is_empty() {
                    games.push(std::mem::take(&mut game));
                }
                game.tags.push((name, value));
            }
            Token::VariationStart => open_variations.push(line),
            Token::VariationEnd => {
                open_variations
                    .pop()
                    .ok_or(PgnError::UnbalancedVariation(line))?;
            }
            _ if !open_variations.is_empty() => {}
            Token::Result(result) => {
                game.result = Some(result.to_string());
                games.push(std::mem::take(&mut game));
            }
            Token::San(san) => game.moves.push(san.to_string()),
            Token::Comment | Token::Nag | Token::MoveNumber => {}
        }
    }

    if let Some(&open_line) = open_variations.last() {
        return Err(PgnError::UnbalancedVariation(open_line));
    }
    if !game.tags.is_empty() || !game.moves.is_empty() {
        games.push(game);
    }

    Ok(games)
}

fn line_of(text: &str, rest: &str) -> usize {
    text[..text.len() - rest.len()].matches('\n').count() + 1
}

// Works out why no token could be read at the start of `rest`.
fn token_error(rest: &str, first: char, line: usize) -> PgnError {
    match first {
        '{' => PgnError::UnterminatedComment(line),
        '[' => {
            let tag_line = rest.lines().next().unwrap_or_default().trim_end();
            if tag_line.ends_with(']') {
                PgnError::MalformedTag(line, tag_line.to_string())
            } else {
                PgnError::UnterminatedTag(line)
            }
        }
        ch => PgnError::UnexpectedCharacter(line, ch),
    }
}

// ======================================================
// Winnow Parsing functions
// ======================================================

fn parse_token<'s>(input: &mut &'s str) -> WinnowResult<Token<'s>> {
    alt((
        parse_tag,
        parse_comment,
        '('.value(Token::VariationStart),
        ')'.value(Token::VariationEnd),
        preceded('$', digit1).value(Token::Nag),
        // move numbers must go before results because "1." and "1-0" share a prefix
        terminated(digit1, take_while(1.., '.')).value(Token::MoveNumber),
        parse_symbol.verify_map(|symbol| RESULTS.contains(&symbol).then_some(Token::Result(symbol))),
        parse_symbol.map(Token::San),
    ))
    .parse_next(input)
}

fn parse_tag<'s>(input: &mut &'s str) -> WinnowResult<Token<'s>> {
    delimited(
        ('[', space0),
        (
            terminated(take_while(1.., |ch: char| ch.is_ascii_alphanumeric() || ch == '_'), space1),
            parse_tag_value,
        ),
        (space0, ']'),
    )
    .map(|(name, value): (&str, String)| Token::Tag(name.to_string(), value))
    .parse_next(input)
}

// A quoted string where only '\"' and '\\' are escapes.
fn parse_tag_value(input: &mut &str) -> WinnowResult<String> {
    delimited(
        '"',
        repeat(
            0..,
            alt((
                preceded('\\', one_of(['"', '\\'])),
                none_of(['"', '\\', '\n']),
            )),
        ),
        '"',
    )
    .parse_next(input)
}

// Brace comments, rest-of-line comments and '%' escape lines.
fn parse_comment<'s>(input: &mut &'s str) -> WinnowResult<Token<'s>> {
    alt((
        delimited('{', take_until(0.., "}"), '}'),
        preceded(one_of([';', '%']), till_line_ending),
    ))
    .value(Token::Comment)
    .parse_next(input)
}

fn parse_symbol<'s>(input: &mut &'s str) -> WinnowResult<&'s str> {
    take_while(1.., |ch: char| {
        !ch.is_whitespace() && !matches!(ch, '{' | '}' | '(' | ')' | '[' | ']' | ';')
    })
    .parse_next(input)
}
