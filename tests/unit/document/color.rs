use super::*;

#[test]
fn hex_forms_parse() {
    assert_eq!(parse_color("#f00"), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(parse_color("#00ff7f"), Some(Rgba8::opaque(0, 255, 127)));
    assert_eq!(
        parse_color("#0000ff80"),
        Some(Rgba8 {
            r: 0,
            g: 0,
            b: 255,
            a: 128
        })
    );
    assert_eq!(parse_color("#12345"), None);
    assert_eq!(parse_color("#zzz"), None);
}

#[test]
fn names_are_case_insensitive() {
    assert_eq!(parse_color("Blue"), Some(Rgba8::opaque(0, 0, 255)));
    assert_eq!(parse_color(" grey "), Some(Rgba8::opaque(128, 128, 128)));
    assert_eq!(parse_color("notacolor"), None);
}

#[test]
fn rgb_functions_parse_and_clamp() {
    assert_eq!(parse_color("rgb(10, 20, 300)"), Some(Rgba8::opaque(10, 20, 255)));
    assert_eq!(
        parse_color("rgba(0,0,0,0.5)"),
        Some(Rgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 128
        })
    );
    assert_eq!(parse_color("rgb(1,2)"), None);
}

#[test]
fn unknown_colors_resolve_to_black() {
    assert_eq!(resolve_color("mauve-ish", "color"), Rgba8::BLACK);
    assert_eq!(resolve_color("red", "color"), Rgba8::opaque(255, 0, 0));
}
