//! Built-in resources: the lowest layer of every registry.

use regex::Regex;

use crate::registry::{SnippetValue, Storage};

/// Level of the built-in stores. Configured layers go above it.
pub const DEFAULT_LEVEL: i32 = 0;

const MARKUP_ABBREVIATIONS: &[(&str, &str)] = &[
    ("a", "a[href]"),
    ("a:link", "a[href=http://${1}]"),
    ("a:mail", "a[href=mailto:${1}]"),
    ("abbr", "abbr[title]"),
    ("acr|acronym", "acronym[title]"),
    ("base", "base[href]/"),
    ("basefont", "basefont/"),
    ("br", "br/"),
    ("frame", "frame/"),
    ("hr", "hr/"),
    ("bdo", "bdo[dir]"),
    ("bdo:r", "bdo[dir=rtl]"),
    ("bdo:l", "bdo[dir=ltr]"),
    ("col", "col/"),
    ("link", "link[rel=stylesheet href]/"),
    ("link:css", "link[rel=stylesheet href=${1:style}.css]/"),
    ("link:favicon", "link[rel=\"shortcut icon\" type=image/x-icon href=${1:favicon.ico}]/"),
    ("link:rss", "link[rel=alternate type=application/rss+xml title=RSS href=${1:rss.xml}]/"),
    ("meta", "meta/"),
    ("meta:utf", "meta[http-equiv=Content-Type content=\"text/html;charset=UTF-8\"]/"),
    ("meta:vp", "meta[name=viewport content=\"width=${1:device-width}, initial-scale=${2:1.0}\"]/"),
    ("meta:compat", "meta[http-equiv=X-UA-Compatible content=\"${1:IE=7}\"]/"),
    ("style", "style"),
    ("script", "script[!src]"),
    ("script:src", "script[src]"),
    ("img", "img[src alt]/"),
    ("iframe|ifr", "iframe[src frameborder=0]"),
    ("embed|emb", "embed[src type]/"),
    ("object|obj", "object[data type]"),
    ("param", "param[name value]/"),
    ("map", "map[name]"),
    ("area", "area[shape coords href alt]/"),
    ("area:d", "area[shape=default href alt]/"),
    ("area:c", "area[shape=circle coords href alt]/"),
    ("area:r", "area[shape=rect coords href alt]/"),
    ("area:p", "area[shape=poly coords href alt]/"),
    ("form", "form[action]"),
    ("form:get", "form[action method=get]"),
    ("form:post", "form[action method=post]"),
    ("label", "label[for]"),
    ("input", "input[type=${1:text}]/"),
    ("inp", "input[name id]/"),
    ("input:hidden|input:h", "input[type=hidden name]/"),
    ("input:text|input:t", "input[type=text name id]/"),
    ("input:search", "input[type=search name id]/"),
    ("input:email", "input[type=email name id]/"),
    ("input:url", "input[type=url name id]/"),
    ("input:password|input:p", "input[type=password name id]/"),
    ("input:number", "input[type=number name id]/"),
    ("input:date", "input[type=date name id]/"),
    ("input:checkbox|input:c", "input[type=checkbox name id]/"),
    ("input:radio|input:r", "input[type=radio name id]/"),
    ("input:file|input:f", "input[type=file name id]/"),
    ("input:submit|input:s", "input[type=submit value]/"),
    ("input:image|input:i", "input[type=image src alt]/"),
    ("input:button|input:b", "input[type=button value]/"),
    ("input:reset", "input[type=reset value]/"),
    ("select", "select[name id]"),
    ("select:disabled|select:d", "select[name id disabled.]"),
    ("option|opt", "option[value]"),
    ("textarea", "textarea[name id cols=${1:30} rows=${2:10}]"),
    ("marquee", "marquee[behavior direction]"),
    ("menu:context|menu:c", "menu[type=context]"),
    ("menu:toolbar|menu:t", "menu[type=toolbar]"),
    ("video", "video[src]"),
    ("audio", "audio[src]"),
    ("html:xml", "html[xmlns=http://www.w3.org/1999/xhtml]"),
    ("keygen", "keygen/"),
    ("command", "command/"),
    ("button:submit|button:s|btn:s", "button[type=submit]"),
    ("button:reset|button:r|btn:r", "button[type=reset]"),
    ("button:disabled|button:d|btn:d", "button[disabled.]"),
    ("fieldset:disabled|fieldset:d|fset:d|fst:d", "fieldset[disabled.]"),
    ("bq", "blockquote"),
    ("fig", "figure"),
    ("figc", "figcaption"),
    ("pic", "picture"),
    ("btn", "button"),
    ("cap", "caption"),
    ("colg", "colgroup"),
    ("fst|fset", "fieldset"),
    ("sect", "section"),
    ("art", "article"),
    ("hdr", "header"),
    ("ftr", "footer"),
    ("adr", "address"),
    ("dlg", "dialog"),
    ("str", "strong"),
    ("prog", "progress"),
    ("mn", "main"),
    ("tem", "template"),
    ("datag", "datagrid"),
    ("datal", "datalist"),
    ("kg", "keygen"),
    ("out", "output"),
    ("det", "details"),
    ("cmd", "command"),
    ("doc", "html[lang=${lang}]>(head>meta[charset=${charset}]/+meta:vp+title{${1:Document}})+body"),
    ("!!!", "{<!DOCTYPE html>}"),
    ("!|html:5", "!!!+doc"),
    ("ri:dpr|ri:d", "img[srcset=\"${1:image.jpg} 1x, ${2:image@2x.jpg} 2x\" src=${1} alt]/"),
    ("ri:type|ri:t", "picture>source[srcset=${1:image.webp} type=image/${2:webp}]/+img[src=${3:image.jpg} alt]/"),
];

const MARKUP_SNIPPETS: &[(&str, &str)] = &[
    ("cc:ie6", "<!--[if lte IE 6]>\n\t${child}\n<![endif]-->"),
    ("cc:ie", "<!--[if IE]>\n\t${child}\n<![endif]-->"),
    ("cc:noie", "<!--[if !IE]><!-->\n\t${child}\n<!--<![endif]-->"),
    ("c", "<!-- ${child}${1} -->"),
];

const STYLESHEET_SNIPPETS: &[(&str, &str)] = &[
    ("!", "!important"),
    ("@f", "@font-face {\n\tfont-family: ${1};\n\tsrc: url(${2});\n}"),
    ("@i|@import", "@import url(${1});"),
    ("@m|@media", "@media ${1:screen} {\n\t${0}\n}"),
    ("@kf", "@keyframes ${1:identifier} {\n\t${0}\n}"),
    ("pos", "position:relative|absolute|fixed|static|sticky"),
    ("t", "top"),
    ("r", "right"),
    ("b", "bottom"),
    ("l", "left"),
    ("z", "z-index"),
    ("fl", "float:left|right|none"),
    ("cl", "clear:both|left|right|none"),
    ("d", "display:block|none|flex|inline|inline-block|grid|table"),
    ("v", "visibility:hidden|visible|collapse"),
    ("ov", "overflow:hidden|auto|scroll|visible"),
    ("ovx", "overflow-x:hidden|auto|scroll|visible"),
    ("ovy", "overflow-y:hidden|auto|scroll|visible"),
    ("cur", "cursor:pointer|default|text|move|wait|help"),
    ("bxz", "box-sizing:border-box|content-box"),
    ("bxsh", "box-shadow:${1:inset }${2:hoff} ${3:voff} ${4:blur} ${5:#000}"),
    ("w", "width"),
    ("h", "height"),
    ("maw", "max-width"),
    ("mah", "max-height"),
    ("miw", "min-width"),
    ("mih", "min-height"),
    ("m", "margin"),
    ("mt", "margin-top"),
    ("mr", "margin-right"),
    ("mb", "margin-bottom"),
    ("ml", "margin-left"),
    ("p", "padding"),
    ("pt", "padding-top"),
    ("pr", "padding-right"),
    ("pb", "padding-bottom"),
    ("pl", "padding-left"),
    ("c", "color:${1:#000}"),
    ("op", "opacity"),
    ("fz", "font-size"),
    ("fw", "font-weight:bold|normal|bolder|lighter"),
    ("fs", "font-style:italic|normal|oblique"),
    ("ff", "font-family:serif|sans-serif|monospace"),
    ("lh", "line-height"),
    ("ta", "text-align:left|center|right|justify"),
    ("td", "text-decoration:none|underline|overline|line-through"),
    ("tt", "text-transform:uppercase|lowercase|capitalize|none"),
    ("ti", "text-indent"),
    ("tov", "text-overflow:ellipsis|clip"),
    ("whs", "white-space:nowrap|pre|pre-wrap|pre-line|normal"),
    ("wob", "word-break:break-all|keep-all|normal"),
    ("va", "vertical-align:top|middle|bottom|baseline"),
    ("bg", "background:${1:#000}"),
    ("bgc", "background-color:${1:#fff}"),
    ("bgi", "background-image:url(${1})"),
    ("bgr", "background-repeat:no-repeat|repeat-x|repeat-y|repeat"),
    ("bgp", "background-position:${1:0} ${2:0}"),
    ("bgsz", "background-size:cover|contain"),
    ("bd", "border:${1:1px} ${2:solid} ${3:#000}"),
    ("bdt", "border-top:${1:1px} ${2:solid} ${3:#000}"),
    ("bdr", "border-right:${1:1px} ${2:solid} ${3:#000}"),
    ("bdb", "border-bottom:${1:1px} ${2:solid} ${3:#000}"),
    ("bdl", "border-left:${1:1px} ${2:solid} ${3:#000}"),
    ("bdc", "border-color:${1:#000}"),
    ("bds", "border-style:solid|dashed|dotted|double|none"),
    ("bdw", "border-width"),
    ("bdrs", "border-radius"),
    ("bdcl", "border-collapse:collapse|separate"),
    ("ol", "outline"),
    ("trf", "transform"),
    ("trs", "transition:${1:prop} ${2:time}"),
    ("anim", "animation:${1:name} ${2:duration}"),
    ("fx", "flex"),
    ("fxd", "flex-direction:row|column|row-reverse|column-reverse"),
    ("fxw", "flex-wrap:wrap|nowrap|wrap-reverse"),
    ("fxg", "flex-grow"),
    ("fxsh", "flex-shrink"),
    ("fxb", "flex-basis"),
    ("jc", "justify-content:center|flex-start|flex-end|space-between|space-around"),
    ("ai", "align-items:center|flex-start|flex-end|stretch|baseline"),
    ("ac", "align-content:center|flex-start|flex-end|stretch|space-between"),
    ("ord", "order"),
    ("g", "gap"),
    ("gtc", "grid-template-columns:repeat(${1:2}, ${2:1fr})"),
    ("gtr", "grid-template-rows:repeat(${1:2}, ${2:1fr})"),
    ("cnt", "content:'${1}'"),
    ("lis", "list-style:none|disc|circle|square|decimal"),
    ("lisp", "list-style-position:inside|outside"),
    ("us", "user-select:none|auto|text"),
    ("pe", "pointer-events:none|auto"),
    ("rsz", "resize:none|both|horizontal|vertical"),
];

const VARIABLES: &[(&str, &str)] = &[
    ("lang", "en"),
    ("locale", "en-US"),
    ("charset", "UTF-8"),
];

const LOREM: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipisicing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
    "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui",
    "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

const LOREM_DEFAULT_WORDS: usize = 30;

/// Element abbreviations for markup syntaxes, including `lorem`/`loremN`.
pub fn markup_abbreviations() -> Storage {
    let mut store = Storage::from_pairs(MARKUP_ABBREVIATIONS.iter().copied());
    if let Ok(pattern) = Regex::new(r"^(?:lorem|lipsum)(\d*)$") {
        store.set(pattern, SnippetValue::function(lorem_abbreviation));
    }
    store
}

/// Text snippets with a `${child}` slot.
pub fn markup_snippets() -> Storage {
    Storage::from_pairs(MARKUP_SNIPPETS.iter().copied())
}

pub fn stylesheet_snippets() -> Storage {
    Storage::from_pairs(STYLESHEET_SNIPPETS.iter().copied())
}

pub fn variables() -> Storage {
    Storage::from_pairs(VARIABLES.iter().copied())
}

/// `lorem12` -> a text node with twelve words of placeholder text.
fn lorem_abbreviation(name: &str) -> String {
    let count = name
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .unwrap_or(LOREM_DEFAULT_WORDS);
    format!("{{{}}}", lorem(count))
}

/// `count` words of placeholder text as one capitalized sentence.
pub fn lorem(count: usize) -> String {
    let mut words: Vec<String> = LOREM
        .iter()
        .cycle()
        .take(count)
        .map(ToString::to_string)
        .collect();
    if let Some(first) = words.first_mut() {
        let mut chars = first.chars();
        if let Some(initial) = chars.next() {
            *first = initial.to_uppercase().chain(chars).collect();
        }
    }
    if words.is_empty() {
        return String::new();
    }
    format!("{}.", words.join(" "))
}
