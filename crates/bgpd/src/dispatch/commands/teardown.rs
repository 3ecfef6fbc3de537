//! `teardown <description> <code>`.

use tracing::info;

use crate::dispatch::DISPATCH_TARGET;
use crate::dispatch::errors::CommandError;
use crate::dispatch::registry::{HandlerContext, HandlerOutcome, Invocation};
use crate::dispatch::selector::parse_selectors;

/// Asks every established peer matching the description to close.
///
/// Answers `done` even when nothing matched.
pub(crate) fn teardown(
    invocation: &Invocation<'_>,
    context: &mut HandlerContext<'_>,
) -> Result<HandlerOutcome, CommandError> {
    let (description, code) = invocation
        .arguments
        .rsplit_once(' ')
        .ok_or(CommandError::MissingCode)?;
    let code = parse_code(code)?;
    let selectors =
        parse_selectors(description).map_err(|source| CommandError::InvalidDescription {
            description: description.to_owned(),
            source,
        })?;

    for key in context.peers.established_peers() {
        let Some(name) = context.peers.neighbor_name(&key) else {
            continue;
        };
        let Some(selector) = selectors.iter().find(|selector| selector.matches(&name)) else {
            continue;
        };
        context.peers.teardown_peer(&key, code);
        info!(
            target: DISPATCH_TARGET,
            peer = %key,
            code,
            "teardown scheduled for {selector}"
        );
    }
    Ok(HandlerOutcome::Answered(Vec::new()))
}

/// Any run of decimal digits is accepted; the session machine decides what
/// the code means.
fn parse_code(text: &str) -> Result<u32, CommandError> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(CommandError::invalid_code(text));
    }
    text.parse().map_err(|_| CommandError::invalid_code(text))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("6", Some(6))]
    #[case("0", Some(0))]
    #[case("255", Some(255))]
    #[case("256", Some(256))]
    #[case("4294967295", Some(u32::MAX))]
    #[case("4294967296", None)]
    #[case("0006", Some(6))]
    #[case("abc", None)]
    #[case("-1", None)]
    #[case("+6", None)]
    #[case("", None)]
    fn parses_decimal_codes(#[case] text: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_code(text).ok(), expected);
    }
}
