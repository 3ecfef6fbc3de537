//! Behavioural tests for `family` block validation.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use bgp_config::{Afi, BgpConfiguration};

#[derive(Default)]
struct FamilyWorld {
    source: String,
    parsed: Option<Result<BgpConfiguration, String>>,
}

impl FamilyWorld {
    fn configuration(&self) -> &BgpConfiguration {
        match self.parsed.as_ref() {
            Some(Ok(configuration)) => configuration,
            Some(Err(error)) => panic!("configuration failed to parse: {error}"),
            None => panic!("configuration was not parsed"),
        }
    }

    fn error(&self) -> &str {
        match self.parsed.as_ref() {
            Some(Err(error)) => error,
            Some(Ok(_)) => panic!("configuration parsed unexpectedly"),
            None => panic!("configuration was not parsed"),
        }
    }
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}

#[fixture]
fn world() -> RefCell<FamilyWorld> {
    RefCell::new(FamilyWorld::default())
}

#[given("a family block containing \"{body}\"")]
fn given_family_block(world: &RefCell<FamilyWorld>, body: String) {
    world.borrow_mut().source = format!("family test {{\n    {}\n}}\n", strip_quotes(&body));
}

#[when("the neighbor configuration is parsed")]
fn when_parsed(world: &RefCell<FamilyWorld>) {
    let mut world = world.borrow_mut();
    let parsed = BgpConfiguration::parse(&world.source).map_err(|error| error.to_string());
    world.parsed = Some(parsed);
}

#[then("the family declares {ipv4} ipv4 pairs, {ipv6} ipv6 pairs and {l2vpn} l2vpn pair")]
fn then_family_declares(world: &RefCell<FamilyWorld>, ipv4: usize, ipv6: usize, l2vpn: usize) {
    let world = world.borrow();
    let families = world
        .configuration()
        .family("test")
        .expect("family block 'test'");
    assert_eq!(families.safis(Afi::Ipv4).len(), ipv4);
    assert_eq!(families.safis(Afi::Ipv6).len(), ipv6);
    assert_eq!(families.safis(Afi::L2vpn).len(), l2vpn);
    assert_eq!(families.len(), ipv4 + ipv6 + l2vpn);
}

#[then("loading fails mentioning \"{fragment}\"")]
fn then_loading_fails(world: &RefCell<FamilyWorld>, fragment: String) {
    let world = world.borrow();
    let error = world.error();
    assert!(
        error.contains(strip_quotes(&fragment)),
        "expected '{fragment}' in '{error}'"
    );
}

#[then("the error points at line {line}")]
fn then_error_line(world: &RefCell<FamilyWorld>, line: usize) {
    let world = world.borrow();
    let error = world.error();
    assert!(
        error.starts_with(&format!("line {line}, column ")),
        "expected a line {line} location in '{error}'"
    );
}

#[scenario(
    path = "tests/features/family_declarations.feature",
    name = "The all keyword expands to every implemented pair"
)]
fn all_keyword_expands(#[from(world)] world: RefCell<FamilyWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/family_declarations.feature",
    name = "Explicit lists declare only the listed pairs"
)]
fn explicit_lists(#[from(world)] world: RefCell<FamilyWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/family_declarations.feature",
    name = "A repeated pair aborts loading"
)]
fn repeated_pair(#[from(world)] world: RefCell<FamilyWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/family_declarations.feature",
    name = "An unimplemented pair aborts loading"
)]
fn unimplemented_pair(#[from(world)] world: RefCell<FamilyWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/family_declarations.feature",
    name = "An unknown subsequent family aborts loading"
)]
fn unknown_subsequent_family(#[from(world)] world: RefCell<FamilyWorld>) {
    drop(world);
}
