use tagsmith_syntax::lexer::{TokenTree, tokenize};

#[test]
fn test_quoted_and_grouped_tokens() {
    let tokens: Vec<_> = tokenize(r#"a "b c" d,e"#).collect();

    assert_eq!(tokens.len(), 3);

    match &tokens[0] {
        TokenTree::Single(t) => assert_eq!(t.content(), "a"),
        _ => panic!("Expected single token"),
    }

    match &tokens[1] {
        TokenTree::Single(t) => {
            assert_eq!(t.content(), "b c");
            assert!(t.is_quoted());
        }
        _ => panic!("Expected single token"),
    }

    match &tokens[2] {
        TokenTree::Group(members) => {
            let contents: Vec<_> = members.iter().map(|t| t.content()).collect();
            assert_eq!(contents, vec!["d", "e"]);
        }
        _ => panic!("Expected multi-value group"),
    }
}

#[test]
fn test_single_and_double_quotes() {
    let tokens: Vec<_> = tokenize(r#"name "alice" 'bob'"#).collect();

    let contents: Vec<_> = tokens
        .iter()
        .map(|t| t.as_single().unwrap().content())
        .collect();
    assert_eq!(contents, vec!["name", "alice", "bob"]);
}

#[test]
fn test_quoted_comma_inside_group() {
    let tokens: Vec<_> = tokenize(r#"tags "a,b","c d" rest"#).collect();

    assert_eq!(tokens.len(), 3);
    match &tokens[1] {
        TokenTree::Group(members) => {
            assert_eq!(members.len(), 2);
            assert_eq!(members[0].content(), "a,b");
            assert_eq!(members[1].content(), "c d");
        }
        _ => panic!("Expected multi-value group"),
    }
}

#[test]
fn test_source_order_is_preserved() {
    let source = "with a=1 b=2 as result";
    let texts: Vec<_> = tokenize(source).map(|t| t.text()).collect();
    assert_eq!(texts, vec!["with", "a=1", "b=2", "as", "result"]);

    let starts: Vec<_> = tokenize(source).map(|t| t.span().start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn test_filter_syntax_stays_in_one_token() {
    let texts: Vec<_> = tokenize(r#"value|default:"x y" next"#).map(|t| t.text()).collect();
    assert_eq!(texts, vec![r#"value|default:"x y""#, "next"]);
}

#[test]
fn test_trailing_and_stray_commas() {
    let texts: Vec<_> = tokenize("a, , b,").map(|t| t.text()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}

#[test]
fn test_unterminated_non_ascii_quote() {
    let tokens: Vec<_> = tokenize(r#"show "naïve café"#).collect();
    assert_eq!(tokens.len(), 2);
    let token = tokens[1].as_single().unwrap();
    assert!(!token.is_quoted());
    assert_eq!(token.content(), r#""naïve café"#);
}
