use hyscript::{
    Error,
    types::{BaseType, Property, PropertyFlags, Type, TypeRule},
};
use proptest::prelude::*;
use strum::IntoEnumIterator;

fn rule_of(letters: &str) -> TypeRule {
    match Type::parse(letters) {
        Err(Error::InvalidPropertyCombination { rule, .. }) => rule,
        other => panic!("expected `{letters}` to be rejected by the table, got {other:?}"),
    }
}

#[test]
fn key_type_parses_in_any_order() {
    let a = Type::parse("Konudems").unwrap();
    let b = Type::parse("smeduonK").unwrap();
    let c = Type::parse("KKonudemss").unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
    assert!(a.is_valid());
    assert_eq!(a.canonical_text(), "Konduesm");
    assert_eq!(a.to_string(), "Konduesm");
}

#[test]
fn table_boundary_cases() {
    assert!(Type::parse("zo").unwrap_err().is_invalid_property_combination());
    assert_eq!(rule_of("Bzom"), TypeRule::ZeroArgExcludesOneArg);
    assert_eq!(rule_of("Vd"), TypeRule::VerifyExcludesDissatisfiable);
    assert_eq!(rule_of("K"), TypeRule::KeyImpliesUnit);
    assert!(Type::parse("Ko").is_err());
    assert!(Type::parse("Kous").is_ok());
}

#[test]
fn exactly_one_base_type() {
    assert_eq!(rule_of(""), TypeRule::SingleBaseType);
    assert_eq!(rule_of("BV"), TypeRule::SingleBaseType);
    assert_eq!(rule_of("KWus"), TypeRule::SingleBaseType);
    for base in ["B", "W"] {
        assert_eq!(Type::parse(base).unwrap().canonical_text(), base);
    }
}

#[test]
fn unknown_tag_is_reported_before_the_table() {
    assert_eq!(
        Type::parse("Kq").unwrap_err(),
        Error::UnknownPropertyTag { tag: 'q' }
    );
    // `S` is not `s`: tags are case sensitive.
    assert_eq!(
        Type::parse("KouS").unwrap_err(),
        Error::UnknownPropertyTag { tag: 'S' }
    );
    // An unknown letter wins even when the known ones are invalid on their own.
    assert!(Type::parse("BV?").unwrap_err().is_unknown_property_tag());
}

#[test]
fn each_rule_is_reported_first_when_violated() {
    let cases = [
        ("", TypeRule::SingleBaseType),
        ("Bzom", TypeRule::ZeroArgExcludesOneArg),
        ("Bznm", TypeRule::NonzeroArgExcludesZeroArg),
        ("Vdf", TypeRule::VerifyExcludesDissatisfiable),
        ("Ks", TypeRule::KeyImpliesUnit),
        ("Vuf", TypeRule::VerifyExcludesUnit),
        ("Bef", TypeRule::ExpressionExcludesForced),
        ("Be", TypeRule::ExpressionImpliesDissatisfiable),
        ("Bdf", TypeRule::DissatisfiableExcludesForced),
        ("V", TypeRule::VerifyImpliesForced),
        ("Ku", TypeRule::KeyImpliesSafe),
        ("Bz", TypeRule::ZeroArgImpliesNonmalleable),
    ];
    for (letters, rule) in cases {
        assert_eq!(rule_of(letters), rule, "wrong rule reported for `{letters}`");
    }
}

#[test]
fn verify_excludes_expression_is_checked() {
    // Never reported first: `e` requires `d`, which `V` already excludes.
    let flags = PropertyFlags::VERIFY | PropertyFlags::EXPRESSION | PropertyFlags::FORCED;
    assert!(!TypeRule::VerifyExcludesExpression.holds(flags));
    assert!(TypeRule::violated(flags).any(|rule| rule == TypeRule::VerifyExcludesExpression));
    assert!(TypeRule::VerifyExcludesExpression.holds(PropertyFlags::VERIFY | PropertyFlags::FORCED));
}

#[test]
fn common_types_are_valid() {
    for letters in ["Bzud", "Bzu", "Bz", "Bondu", "Vf", "Vfs", "Wdu", "Kndus", "Bdemsux"] {
        let flags = letters
            .chars()
            .map(|c| Property::from_letter(c).unwrap().flag())
            .fold(PropertyFlags::empty(), |acc, flag| acc | flag);
        let expected_valid = TypeRule::first_violated(flags).is_none();
        assert_eq!(Type::parse(letters).is_ok(), expected_valid, "{letters}");
    }
    assert!(Type::parse("Vf").is_ok());
    assert!(Type::parse("Bdemsu").is_ok());
}

#[test]
fn base_and_properties() {
    let ty: Type = "udB".parse().unwrap();
    assert_eq!(ty.base(), BaseType::Base);
    assert_eq!(ty.base().to_string(), "B");
    assert_eq!(
        ty.properties().collect::<Vec<_>>(),
        vec![Property::Base, Property::Dissatisfiable, Property::Unit]
    );
    assert!(ty.has(Property::Unit));
    assert!(!ty.has(Property::Safe));

    let key = Type::parse("Konudems").unwrap();
    assert_eq!(key.base(), BaseType::Key);
    assert!(key.base().is_key());
}

#[test]
fn every_base_type_is_recovered() {
    for (letters, base) in [
        ("Bu", BaseType::Base),
        ("Vf", BaseType::Verify),
        ("Kus", BaseType::Key),
        ("Wdu", BaseType::Wrapped),
    ] {
        let ty = Type::parse(letters).unwrap();
        assert_eq!(ty.base(), base, "{letters}");
        assert_eq!(BaseType::from_flags(ty.flags()), Some(base));
    }
    assert_eq!(BaseType::from_flags(PropertyFlags::BASE | PropertyFlags::KEY), None);
    assert_eq!(BaseType::from_flags(PropertyFlags::UNIT), None);
}

#[test]
fn subtyping() {
    let key = Type::parse("Konudems").unwrap();
    let required = Type::parse("Kus").unwrap();
    assert!(key.satisfies(&required));
    assert!(!required.satisfies(&key));
    assert!(key.satisfies(&key));
    assert!(key.satisfies_flags(PropertyFlags::NONMALLEABLE | PropertyFlags::SAFE));
    assert!(!key.satisfies(&Type::parse("B").unwrap()));
}

#[test]
fn derived_flags_are_validated() {
    let flags = PropertyFlags::BASE | PropertyFlags::ZERO_ARG;
    assert_eq!(
        Type::from_flags(flags).unwrap_err(),
        Error::InvalidPropertyCombination {
            flags,
            rule: TypeRule::ZeroArgImpliesNonmalleable,
        }
    );
    let fixed = Type::try_from(flags | PropertyFlags::NONMALLEABLE).unwrap();
    assert_eq!(fixed.canonical_text(), "Bzm");
    assert_eq!(PropertyFlags::from(fixed), flags | PropertyFlags::NONMALLEABLE);
}

#[test]
fn alphabet_is_in_canonical_order() {
    let alphabet: String = Property::iter().map(Property::letter).collect();
    assert_eq!(alphabet, "BVKWzonduefsmx");
    for property in Property::iter() {
        assert_eq!(Property::from_letter(property.letter()), Some(property));
        assert_eq!(property.is_base_type(), "BVKW".contains(property.letter()));
    }
}

#[test]
fn error_messages_name_the_culprit() {
    let message = Type::parse("Vd").unwrap_err().to_string();
    assert!(message.contains("`Vd`"), "{message}");
    assert!(message.contains("`V` excludes `d`"), "{message}");

    let message = Type::parse("x!").unwrap_err().to_string();
    assert!(message.contains("`!`"), "{message}");
}

fn alphabet() -> Vec<char> {
    Property::iter().map(Property::letter).collect()
}

proptest! {
    #[test]
    fn canonical_text_round_trips(letters in proptest::sample::subsequence(alphabet(), 0..=14).prop_shuffle()) {
        let input: String = letters.iter().collect();
        if let Ok(ty) = Type::parse(&input) {
            let text = ty.canonical_text();
            let reparsed = Type::parse(&text).unwrap();
            prop_assert_eq!(reparsed, ty);
            prop_assert_eq!(reparsed.canonical_text(), text.clone());
            prop_assert_eq!(text.len(), letters.len());
        }
    }

    #[test]
    fn parse_agrees_with_the_table(bits in 0u16..(1 << 14)) {
        let flags = PropertyFlags::from_bits_truncate(bits);
        let input = flags.to_string();
        match Type::parse(&input) {
            Ok(ty) => {
                prop_assert!(TypeRule::violated(flags).next().is_none());
                prop_assert_eq!(ty.flags(), flags);
            }
            Err(Error::InvalidPropertyCombination { flags: reported, rule }) => {
                prop_assert_eq!(reported, flags);
                prop_assert_eq!(TypeRule::first_violated(flags), Some(rule));
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }
}
