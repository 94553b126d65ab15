use hyscript::script::{Opcode, ScriptElement, fmt_template};

#[test]
fn verify_forms_match_the_expensive_verify_property() {
    for opcode in [Opcode::OP_EQUAL, Opcode::OP_CHECKSIG, Opcode::OP_CHECKMULTISIG] {
        assert!(opcode.has_verify_form());
        assert!(opcode.verify_form().is_some());
    }
    assert_eq!(
        Opcode::OP_CHECKSIG.verify_form(),
        Some(Opcode::OP_CHECKSIGVERIFY)
    );
    assert!(!Opcode::OP_1.has_verify_form());
    assert_eq!(Opcode::OP_VERIFY.verify_form(), None);
}

#[test]
fn template_display() {
    let template = [
        ScriptElement::Push(vec![0x02, 0xab]),
        ScriptElement::Op(Opcode::OP_CHECKSIG),
        ScriptElement::Op(Opcode(0xb2)),
    ];
    assert_eq!(
        fmt_template(&template).to_string(),
        "<02ab> OP_CHECKSIG OP_UNKNOWN(0xb2)"
    );
    assert_eq!(fmt_template(&[]).to_string(), "");
    assert!(template[1].is_op());
}
