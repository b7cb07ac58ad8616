use abbrex_engine::fields;
use abbrex_engine::markup;
use abbrex_engine::{ExpandError, ExpandRequest, Expander, FieldOutput, Options, Syntax};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn expand(syntax: Syntax, abbr: &str) -> String {
    Expander::new(syntax).expand(abbr).unwrap()
}

#[rstest]
#[case("a>b", "<a href=\"\"><b></b></a>")]
#[case("div>p", "<div>\n\t<p></p>\n</div>")]
#[case("#main", "<div id=\"main\"></div>")]
#[case("ul>.x", "<ul>\n\t<li class=\"x\"></li>\n</ul>")]
#[case("img", "<img src=\"\" alt=\"\">")]
#[case("input:c", "<input type=\"checkbox\" name=\"\" id=\"\">")]
#[case("btn.big", "<button class=\"big\"></button>")]
#[case("p{hi}+p{there}", "<p>hi</p>\n<p>there</p>")]
#[case("p>span+em", "<p><span></span><em></em></p>")]
#[case("div+span", "<div></div>\n<span></span>")]
#[case("a*3", "<a href=\"\"></a>\n<a href=\"\"></a>\n<a href=\"\"></a>")]
#[case("(h1+p)*2", "<h1></h1>\n<p></p>\n<h1></h1>\n<p></p>")]
#[case(
    "select>option*2",
    "<select name=\"\" id=\"\">\n\t<option value=\"\"></option>\n\t<option value=\"\"></option>\n</select>"
)]
#[case("li.item$$@3*2", "<li class=\"item03\"></li>\n<li class=\"item04\"></li>")]
#[case("cc:ie>p", "<!--[if IE]>\n\t<p></p>\n<![endif]-->")]
#[case("p>lorem4", "<p>Lorem ipsum dolor sit.</p>")]
fn html_expansions(#[case] abbr: &str, #[case] expected: &str) {
    assert_eq!(expand(Syntax::Html, abbr), expected);
}

#[rstest]
#[case(".b>.__e|bem", "<div class=\"b\">\n\t<div class=\"b__e\"></div>\n</div>")]
#[case(".b>.-e_m|bem", "<div class=\"b\">\n\t<div class=\"b__e b__e_m\"></div>\n</div>")]
#[case("div#a.b>p|c", "<div id=\"a\" class=\"b\">\n\t<p></p>\n</div>\n<!-- /#a.b -->")]
#[case("p|e", "&lt;p&gt;&lt;/p&gt;")]
#[case("ul>li*2|s", "<ul><li></li><li></li></ul>")]
#[case("ul#nav>li.item*2|haml", "%ul#nav\n\t%li.item\n\t%li.item")]
fn filter_suffixes(#[case] abbr: &str, #[case] expected: &str) {
    assert_eq!(expand(Syntax::Html, abbr), expected);
}

#[rstest]
#[case(Syntax::Xhtml, "br", "<br />")]
#[case(Syntax::Xml, "a>b", "<a href=\"\">\n\t<b></b>\n</a>")]
#[case(Syntax::Haml, "ul#nav>li.item*2", "%ul#nav\n\t%li.item\n\t%li.item")]
#[case(Syntax::Haml, "a", "%a{:href => \"\"}")]
fn markup_syntaxes(#[case] syntax: Syntax, #[case] abbr: &str, #[case] expected: &str) {
    assert_eq!(expand(syntax, abbr), expected);
}

#[rstest]
#[case(Syntax::Css, "p0", "padding: 0;")]
#[case(Syntax::Css, "p5-6", "padding: 5px 6px;")]
#[case(Syntax::Css, "m10-20", "margin: 10px 20px;")]
#[case(Syntax::Css, "w100p", "width: 100%;")]
#[case(Syntax::Css, "lh1.5", "line-height: 1.5;")]
#[case(Syntax::Css, "pos", "position: relative;")]
#[case(Syntax::Css, "posa", "position: absolute;")]
#[case(Syntax::Css, "c#f", "color: #fff;")]
#[case(Syntax::Css, "p10!", "padding: 10px !important;")]
#[case(Syntax::Css, "auto", "auto: ;")]
#[case(Syntax::Css, "p10+m5", "padding: 10px;\nmargin: 5px;")]
#[case(Syntax::Scss, "p10", "padding: 10px;")]
#[case(Syntax::Sass, "p10", "padding: 10px")]
#[case(Syntax::Stylus, "p10", "padding 10px")]
fn stylesheet_expansions(#[case] syntax: Syntax, #[case] abbr: &str, #[case] expected: &str) {
    assert_eq!(expand(syntax, abbr), expected);
}

#[test]
fn vendor_prefixed_declarations() {
    insta::assert_snapshot!(expand(Syntax::Css, "-bdrs5"), @r"
    -webkit-border-radius: 5px;
    -moz-border-radius: 5px;
    -ms-border-radius: 5px;
    -o-border-radius: 5px;
    border-radius: 5px;
    ");
}

#[test]
fn html5_document() {
    insta::assert_snapshot!(expand(Syntax::Html, "!"), @r#"
<!DOCTYPE html>
<html lang="en">
	<head>
		<meta charset="UTF-8">
		<meta name="viewport" content="width=device-width, initial-scale=1.0">
		<title>Document</title>
	</head>
	<body></body>
</html>
"#);
}

#[test]
fn tabstop_fields_are_unique() {
    let mut expander = Expander::new(Syntax::Html);
    expander.profile.fields = FieldOutput::Tabstops;
    assert_eq!(
        expander.expand("ul>li*2>a").unwrap(),
        "<ul>\n\t<li><a href=\"${1}\">${2}</a></li>\n\t<li><a href=\"${3}\">${4}</a></li>\n</ul>"
    );
}

#[test]
fn haml_carets_skip_written_fields() {
    let mut expander = Expander::new(Syntax::Haml);
    expander.profile.fields = FieldOutput::Tabstops;
    assert_eq!(
        expander.expand("a[title=${1:x}]").unwrap(),
        "%a{:href => \"${2}\", :title => \"${1:x}\"}"
    );
}

#[test]
fn custom_field_output() {
    let mut expander = Expander::new(Syntax::Html);
    expander.profile.fields = FieldOutput::custom(|index, placeholder| format!("[{index}:{placeholder}]"));
    assert_eq!(expander.expand("a").unwrap(), "<a href=\"[1:]\">[2:]</a>");
}

#[test]
fn wraps_pasted_text() {
    let expander = Expander::new(Syntax::Html);
    let wrapped = |abbr, text| {
        expander
            .expand_with(&ExpandRequest::new(abbr).with_text(text))
            .unwrap()
    };
    assert_eq!(wrapped("div", "hello"), "<div>hello</div>");
    assert_eq!(
        wrapped("ul>li*", "one\ntwo"),
        "<ul>\n\t<li>one</li>\n\t<li>two</li>\n</ul>"
    );
    assert_eq!(
        wrapped("ol>li*>a[title=$#]", "x"),
        "<ol>\n\t<li><a href=\"\" title=\"x\"></a></li>\n</ol>"
    );
}

#[test]
fn invalid_abbreviations_fail() {
    let expander = Expander::new(Syntax::Html);
    assert!(matches!(
        expander.expand("a[href"),
        Err(ExpandError::Syntax { .. })
    ));
    assert!(matches!(
        expander.expand("d%v"),
        Err(ExpandError::InvalidAbbreviation { .. })
    ));
    assert!(matches!(
        expander.expand("ul*40>li*40"),
        Err(ExpandError::LimitExceeded { count: 1600, limit: 1000 })
    ));
}

#[test]
fn deep_nesting_fails_instead_of_overflowing() {
    let deep = "b>".repeat(10_000) + "b";
    assert!(matches!(
        Expander::new(Syntax::Html).expand(&deep),
        Err(ExpandError::DepthExceeded { depth: 101, limit: 100 })
    ));

    let expander = Expander::new(Syntax::Html).with_options(Options {
        max_depth: 2,
        ..Options::default()
    });
    assert_eq!(expander.expand("a>b").unwrap(), "<a href=\"\"><b></b></a>");
    assert!(matches!(
        expander.expand("a>b>i"),
        Err(ExpandError::DepthExceeded { depth: 3, limit: 2 })
    ));
}

#[test]
fn squash_is_idempotent() {
    for abbr in ["((a+b))", "(ul>li)*2", "div>(p+p)+span", "((div))"] {
        let mut once = markup::parse(abbr, 1000).unwrap();
        let twice = {
            markup::squash(&mut once);
            once.clone()
        };
        markup::squash(&mut once);
        assert_eq!(once, twice, "{abbr}");
    }
}

#[test]
fn parsed_fields() {
    let parsed = fields::parse("a ${1:first} b ${2:second}").unwrap();
    insta::assert_yaml_snapshot!(parsed.fields, @r"
    - index: 1
      placeholder: first
      location: 2
    - index: 2
      placeholder: second
      location: 10
    ");
}
