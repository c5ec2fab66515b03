use super::*;
use crate::parser::tokenize;
use test_log::test;

fn collect_script(s: &str) -> (Program<'_>, Vec<Diagnostic>) {
    collect(tokenize(s), usize::MAX)
}

fn texts<'a>(tokens: impl IntoIterator<Item = &'a Token<'a>>) -> Vec<&'a str> {
    tokens.into_iter().map(|t| t.text).collect()
}

#[test]
fn no_definition() {
    let (p, diagnostics) = collect_script("1 2 moveto stroke");
    assert!(p.definitions.is_empty());
    assert_eq!(texts(&p.tokens), vec!["1", "2", "moveto", "stroke"]);
    assert!(diagnostics.is_empty());
}

#[test]
fn extracts_definition() {
    let (p, diagnostics) = collect_script(
        "/box { 0 0 moveto 10 0 lineto closepath }\nnewpath box stroke",
    );
    assert!(diagnostics.is_empty());
    assert_eq!(p.definitions.len(), 1);
    let body = p.definitions.get("box").unwrap();
    assert_eq!(
        texts(body.iter()),
        vec!["0", "0", "moveto", "10", "0", "lineto", "closepath"]
    );
    assert_eq!(texts(&p.tokens), vec!["newpath", "box", "stroke"]);
    // positions point into the raw token stream
    assert_eq!(p.tokens[0].pos, 10);
}

#[test]
fn definition_without_brace() {
    let (p, _) = collect_script("/dot 1 1 moveto } dot");
    assert_eq!(
        texts(p.definitions.get("dot").unwrap().iter()),
        vec!["1", "1", "moveto"]
    );
    assert_eq!(texts(&p.tokens), vec!["dot"]);
}

#[test]
fn only_leading_brace_is_dropped() {
    let (p, _) = collect_script("/a { { 1 }");
    assert_eq!(texts(p.definitions.get("a").unwrap().iter()), vec!["{", "1"]);
}

#[test]
fn empty_definition() {
    let (p, diagnostics) = collect_script("/nothing { } nothing");
    assert!(diagnostics.is_empty());
    assert!(p.definitions.get("nothing").unwrap().is_empty());
    assert_eq!(texts(&p.tokens), vec!["nothing"]);
}

#[test]
fn later_definition_overwrites() {
    let (p, _) = collect_script("/a { 1 } /a { 2 3 }");
    assert_eq!(p.definitions.len(), 1);
    assert_eq!(texts(p.definitions.get("a").unwrap().iter()), vec!["2", "3"]);
    assert!(p.tokens.is_empty());
}

#[test]
fn definition_after_use() {
    let (p, _) = collect_script("box /box { 1 2 moveto }");
    assert!(p.definitions.contains("box"));
    assert_eq!(texts(&p.tokens), vec!["box"]);
}

#[test]
fn slash_inside_body_is_body_token() {
    let (p, _) = collect_script("/a { /b 1 } 2");
    assert_eq!(texts(p.definitions.get("a").unwrap().iter()), vec!["/b", "1"]);
    assert_eq!(texts(&p.tokens), vec!["2"]);
}

#[test]
fn unterminated_definition() {
    let (p, diagnostics) = collect_script("1 moveto /foo 1 2 3");
    assert!(!p.definitions.contains("foo"));
    assert_eq!(texts(&p.tokens), vec!["1", "moveto"]);
    assert_eq!(
        diagnostics,
        vec![Diagnostic {
            pos: 2,
            token: "/foo".to_owned(),
            error: MachineError::UnterminatedDefinition("foo".to_owned()),
        }]
    );
}

#[test]
fn stray_close_brace_passes_through() {
    let (p, _) = collect_script("1 } 2");
    assert_eq!(texts(&p.tokens), vec!["1", "}", "2"]);
}

#[test]
fn too_many_definitions() {
    let (p, diagnostics) = collect(tokenize("/a { 1 } /b { 2 } /a { 3 } b"), 1);
    assert_eq!(p.definitions.len(), 1);
    assert_eq!(texts(p.definitions.get("a").unwrap().iter()), vec!["3"]);
    assert!(!p.definitions.contains("b"));
    assert_eq!(texts(&p.tokens), vec!["b"]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].error,
        MachineError::TooManyDefinitions {
            name: "b".to_owned(),
            limit: 1
        }
    );
}

#[test]
fn iter_sorted_by_name() {
    let (p, _) = collect_script("/zz { } /aa { 1 } /mm { 2 }");
    let names: Vec<_> = p.definitions.iter().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["aa", "mm", "zz"]);
}
