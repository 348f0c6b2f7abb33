//! Trace Parser
//!
//! Line-oriented bus trace format:
//!
//! ```text
//! # comment
//! W 9001 0016     write word 0x0016 to 0x9001
//! R 0x9000        read 0x9000
//! K a             queue a key press
//! F 30            advance 30 frames
//! ```
//!
//! Addresses and words are hex with an optional `0x` prefix, frame counts are
//! decimal, command letters are case-insensitive. Everything after `#` is
//! ignored, so `#` itself cannot be queued as a key.

use super::TraceCommand;
use crate::{Result, TonebusError};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{digit1, hex_digit1, satisfy, space0, space1},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{preceded, terminated, tuple},
    IResult,
};

fn hex_u16(input: &str) -> IResult<&str, u16> {
    preceded(
        opt(tag_no_case("0x")),
        map_res(hex_digit1, |digits: &str| u16::from_str_radix(digits, 16)),
    )(input)
}

fn write_command(input: &str) -> IResult<&str, TraceCommand> {
    map(
        tuple((tag_no_case("W"), space1, hex_u16, space1, hex_u16)),
        |(_, _, address, _, word)| TraceCommand::Write { address, word },
    )(input)
}

fn read_command(input: &str) -> IResult<&str, TraceCommand> {
    map(
        tuple((tag_no_case("R"), space1, hex_u16)),
        |(_, _, address)| TraceCommand::Read { address },
    )(input)
}

fn key_command(input: &str) -> IResult<&str, TraceCommand> {
    map(
        tuple((tag_no_case("K"), space1, satisfy(|c| !c.is_whitespace()))),
        |(_, _, key)| TraceCommand::Key(key),
    )(input)
}

fn frames_command(input: &str) -> IResult<&str, TraceCommand> {
    map(
        tuple((
            tag_no_case("F"),
            space1,
            map_res(digit1, |digits: &str| digits.parse::<u32>()),
        )),
        |(_, _, frames)| TraceCommand::Frames(frames),
    )(input)
}

fn command(input: &str) -> IResult<&str, TraceCommand> {
    all_consuming(terminated(
        alt((write_command, read_command, key_command, frames_command)),
        space0,
    ))(input)
}

/// Parse one trace line; `Ok(None)` for blank and comment-only lines
pub fn parse_line(text: &str, line: usize) -> Result<Option<TraceCommand>> {
    let body = text.split('#').next().unwrap_or("").trim();
    if body.is_empty() {
        return Ok(None);
    }

    command(body)
        .map(|(_, command)| Some(command))
        .map_err(|_| TonebusError::TraceParse {
            line,
            message: format!("unrecognised command '{}'", body),
        })
}

/// Parse a whole trace
pub fn parse_trace(input: &str) -> Result<Vec<TraceCommand>> {
    let mut commands = Vec::new();
    for (index, text) in input.lines().enumerate() {
        if let Some(command) = parse_line(text, index + 1)? {
            commands.push(command);
        }
    }
    Ok(commands)
}
