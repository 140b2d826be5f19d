#![warn(clippy::uninlined_format_args)]

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while1},
    character::complete::{char, multispace1, u64},
    combinator::{opt, recognize},
    multi::many0,
    sequence::delimited,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

/// `<name> <amount> <channel>[, <channel>...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyDecl<'a> {
    pub name: &'a str,
    pub amount: i64,
    pub channels: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyDeclWithLine<'a> {
    pub line: usize,
    pub party: PartyDecl<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerSource<'a> {
    pub parties: Vec<PartyDeclWithLine<'a>>,
}

impl<'a> LedgerSource<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &PartyDecl<'a>> + '_ {
        self.parties.iter().map(|decl| &decl.party)
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
    #[error("Amount out of range at line {line}: {detail}")]
    InvalidAmount { line: usize, detail: String },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::SyntaxError { line, .. } | ParseError::InvalidAmount { line, .. } => *line,
        }
    }
}

struct RawPartyDecl<'a> {
    name: &'a str,
    sign: Sign,
    magnitude: u64,
    channels: Vec<&'a str>,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

fn sp(input: &str) -> IResult<&str, &str> {
    fn comment(input: &str) -> IResult<&str, &str> {
        delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
    }

    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    recognize(many0(alt((multispace1, comment, line_comment)))).parse(input)
}

fn sign(input: &str) -> IResult<&str, Sign> {
    opt(alt((
        char('+').map(|_| Sign::Positive),
        char('-').map(|_| Sign::Negative),
    )))
    .map(|sign| sign.unwrap_or(Sign::Positive))
    .parse(input)
}

fn amount(input: &str) -> IResult<&str, (Sign, u64)> {
    (sign, u64).parse(input)
}

fn channel_separator(input: &str) -> IResult<&str, ()> {
    (sp, opt(char(',')), sp).map(|_| ()).parse(input)
}

fn channels(input: &str) -> IResult<&str, Vec<&str>> {
    (identifier, many0((channel_separator, identifier)))
        .map(|(first, rest)| {
            let mut channels = Vec::with_capacity(rest.len() + 1);
            channels.push(first);
            channels.extend(rest.into_iter().map(|(_, channel)| channel));
            channels
        })
        .parse(input)
}

fn party_decl(input: &str) -> IResult<&str, RawPartyDecl<'_>> {
    (identifier, sp, amount, sp, channels)
        .map(|(name, _, (sign, magnitude), _, channels)| RawPartyDecl {
            name,
            sign,
            magnitude,
            channels,
        })
        .parse(input)
}

fn party_decl_with_sp(input: &str) -> IResult<&str, RawPartyDecl<'_>> {
    (sp, party_decl, sp).map(|(_, decl, _)| decl).parse(input)
}

fn signed_amount(sign: Sign, magnitude: u64) -> Option<i64> {
    match sign {
        Sign::Positive => i64::try_from(magnitude).ok(),
        Sign::Negative => 0_i64.checked_sub_unsigned(magnitude),
    }
}

fn syntax_error_detail(error: impl std::fmt::Display) -> String {
    format!("expected `<name> <amount> <channel>[, <channel>...]` ({error})")
}

/// Parses one party per line; blank and comment-only lines are skipped.
pub fn parse_ledger(input: &str) -> Result<LedgerSource<'_>, ParseError> {
    let mut parties = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let (rest, _) = sp(line).map_err(|e| ParseError::SyntaxError {
            line: line_no,
            detail: syntax_error_detail(e),
        })?;
        if rest.trim().is_empty() {
            continue;
        }

        let (rest, raw) = party_decl_with_sp(rest).map_err(|e| ParseError::SyntaxError {
            line: line_no,
            detail: syntax_error_detail(e),
        })?;
        if !rest.trim().is_empty() {
            return Err(ParseError::SyntaxError {
                line: line_no,
                detail: format!("unparsed input: {}", rest.trim()),
            });
        }

        let amount =
            signed_amount(raw.sign, raw.magnitude).ok_or_else(|| ParseError::InvalidAmount {
                line: line_no,
                detail: format!("{} does not fit in a signed 64-bit amount", raw.magnitude),
            })?;

        parties.push(PartyDeclWithLine {
            line: line_no,
            party: PartyDecl {
                name: raw.name,
                amount,
                channels: raw.channels,
            },
        });
    }

    Ok(LedgerSource { parties })
}
