use numspin::number::{is_integer_text, parse_number, parse_number_opt, parse_precision};
use proptest::prelude::*;

proptest! {
    #[test]
    fn parsing_never_panics_on_arbitrary_text(text in ".*") {
        let _ = parse_number_opt(&text);
        let _ = parse_number(&text, 0.0);
        let _ = parse_precision(&text, 0);
        let _ = is_integer_text(&text);
    }

    #[test]
    fn alphabetic_text_degrades_to_the_default(
        text in "[a-zA-Z]{1,12}",
        default in -1.0e9f64..1.0e9,
    ) {
        prop_assert!(parse_number_opt(&text).is_none());
        prop_assert_eq!(parse_number(&text, default), default);
        prop_assert_eq!(parse_precision(&text, 7), 7);
        prop_assert!(!is_integer_text(&text));
    }

    #[test]
    fn integer_text_round_trips(n in any::<i32>()) {
        let text = n.to_string();
        prop_assert_eq!(parse_number_opt(&text), Some(f64::from(n)));
        prop_assert!(is_integer_text(&text));
        prop_assert_eq!(parse_precision(&text, 0), 0);
    }

    #[test]
    fn decimal_text_parses_and_reports_its_fraction_length(
        negative in any::<bool>(),
        int_part in 0u32..10_000,
        frac in "[0-9]{1,6}",
    ) {
        let sign = if negative { "-" } else { "" };
        let text = format!("{sign}{int_part}.{frac}");
        let expected: f64 = text.parse().unwrap();

        prop_assert_eq!(parse_number_opt(&text), Some(expected));
        prop_assert_eq!(parse_precision(&text, 99), frac.len());
        prop_assert!(!is_integer_text(&text));
    }

    #[test]
    fn exponent_notation_is_rejected(mantissa in -1_000i32..1_000, exponent in 0u32..9) {
        let text = format!("{mantissa}e{exponent}");
        prop_assert!(parse_number_opt(&text).is_none());
        prop_assert_eq!(parse_number(&text, 42.0), 42.0);
    }

    #[test]
    fn surrounding_whitespace_does_not_change_the_result(
        n in any::<i32>(),
        lead in "[ \t]{0,4}",
        trail in "[ \t]{0,4}",
    ) {
        let padded = format!("{lead}{n}{trail}");
        prop_assert_eq!(parse_number_opt(&padded), Some(f64::from(n)));
        prop_assert!(is_integer_text(&padded));
    }
}
