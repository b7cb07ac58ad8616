// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_abbreviation(size: usize) -> String {
    let base = "(header#top>nav>ul.menu>li.item$*3>a[href=#]{Item $})+(section.content>h2{Title}+p>lorem8)";
    vec![base; size].join("+")
}

#[allow(dead_code)]
pub fn generate_lines(size: usize) -> String {
    (1..=size)
        .map(|i| format!("line {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}
