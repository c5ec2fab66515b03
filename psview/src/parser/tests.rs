use super::*;
use test_case::test_case;
use test_log::test;

fn texts(s: &str) -> Vec<&str> {
    tokenize(s).map(|t| t.text).collect()
}

#[test]
fn tokenize_empty() {
    assert!(texts("").is_empty());
    assert!(texts(" \n\t \r\n").is_empty());
}

#[test]
fn tokenize_ignores_line_structure() {
    assert_eq!(
        texts("100 100 moveto\n  50 50\trlineto\r\nstroke\n"),
        vec!["100", "100", "moveto", "50", "50", "rlineto", "stroke"]
    );
    assert_eq!(
        texts("1 2 moveto 3 4 lineto"),
        texts("1\n2\nmoveto\n\n3 4\nlineto")
    );
}

#[test]
fn token_positions() {
    let tokens: Vec<_> = tokenize("  /box {\n}  box ").collect();
    assert_eq!(
        tokens,
        vec![
            Token::new(0, "/box"),
            Token::new(1, "{"),
            Token::new(2, "}"),
            Token::new(3, "box"),
        ]
    );
}

#[test_case("1" => Some(1.0))]
#[test_case("-98" => Some(-98.0))]
#[test_case("+17" => Some(17.0))]
#[test_case("34.5" => Some(34.5))]
#[test_case("-.5" => Some(-0.5))]
#[test_case(".25" => Some(0.25))]
#[test_case("5." => Some(5.0))]
#[test_case("1e3" => Some(1000.0))]
#[test_case("2.5E-1" => Some(0.25))]
#[test_case("1.2.3" => None)]
#[test_case("12px" => None)]
#[test_case("-" => None)]
#[test_case("." => None)]
#[test_case("inf" => None)]
#[test_case("NaN" => None)]
#[test_case("moveto" => None)]
fn test_parse_number(s: &str) -> Option<f32> {
    parse_number(s)
}

#[test_case("42" => TokenKind::Number(42.0))]
#[test_case("1.2.3" => TokenKind::MalformedNumber)]
#[test_case("-.5x" => TokenKind::MalformedNumber)]
#[test_case("3d" => TokenKind::MalformedNumber)]
#[test_case("/box" => TokenKind::DefinitionStart("box"))]
#[test_case("/" => TokenKind::DefinitionStart(""))]
#[test_case("}" => TokenKind::DefinitionEnd)]
#[test_case("%!PS-Adobe-3.0" => TokenKind::Header)]
#[test_case("#!PS" => TokenKind::Name("#!PS"))]
#[test_case("-" => TokenKind::Name("-"))]
#[test_case("{" => TokenKind::Name("{"))]
#[test_case("rlineto" => TokenKind::Name("rlineto"))]
fn classify(s: &str) -> TokenKind<'_> {
    Token::new(0, s).kind()
}
