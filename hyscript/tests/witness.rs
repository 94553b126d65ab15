use hyscript::{
    Error, Node,
    key::CompressedPublicKey,
    witness::{SatisfactionMaterial, Satisfier, Witness, WitnessElement, WitnessKind},
};

const KEY_HEX: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

fn signature() -> Vec<u8> {
    let mut sig = vec![0x30, 0x44];
    sig.extend(std::iter::repeat_n(0x11, 0x44));
    sig.push(0x01);
    sig
}

#[test]
fn pk_satisfaction_resolves_to_the_signature() {
    let key = CompressedPublicKey::from_hex(KEY_HEX).unwrap();
    let node = Node::pk(&key).unwrap();
    let material = SatisfactionMaterial::new().with_signature(&key, signature());

    assert_eq!(node.satisfaction().resolve(&material).unwrap(), vec![signature()]);
    assert_eq!(
        node.dissatisfaction().unwrap().resolve(&material).unwrap(),
        vec![Vec::<u8>::new()]
    );
}

#[test]
fn missing_signature_is_an_error() {
    let key = CompressedPublicKey::from_hex(KEY_HEX).unwrap();
    let node = Node::pk(&key).unwrap();

    assert_eq!(
        node.satisfaction().resolve(&SatisfactionMaterial::new()).unwrap_err(),
        Error::MissingWitnessMaterial {
            kind: WitnessKind::Signature
        }
    );
    // The dissatisfaction needs no secret material at all.
    assert!(node.dissatisfaction().unwrap().resolve(&SatisfactionMaterial::new()).is_ok());
}

#[test]
fn preimages_and_custom_satisfiers() {
    struct EchoPreimage;

    impl Satisfier for EchoPreimage {
        fn lookup_preimage(&self, hash: &[u8]) -> Option<Vec<u8>> {
            Some(hash.iter().rev().copied().collect())
        }
    }

    let witness = Witness::new([
        WitnessElement::Preimage { hash: vec![1, 2, 3] },
        WitnessElement::Empty,
    ]);
    assert_eq!(witness.resolve(&EchoPreimage).unwrap(), vec![vec![3, 2, 1], vec![]]);
    assert_eq!(
        witness.kinds().collect::<Vec<_>>(),
        vec![Some(WitnessKind::Preimage), None]
    );

    let stored = SatisfactionMaterial::new().with_preimage(vec![0xab; 32], vec![0x42; 32]);
    let witness = Witness::single(WitnessElement::Preimage {
        hash: vec![0xab; 32],
    });
    assert_eq!(witness.resolve(&stored).unwrap(), vec![vec![0x42; 32]]);
    // Satisfiers are also accepted behind a reference.
    let echo: &dyn Satisfier = &EchoPreimage;
    assert_eq!(witness.resolve(&echo).unwrap(), vec![vec![0xab; 32]]);
}

#[test]
fn witness_display() {
    let witness = Witness::new([
        WitnessElement::Signature { key: vec![0x02, 0xff] },
        WitnessElement::Preimage { hash: vec![0x0a] },
        WitnessElement::Empty,
    ]);
    assert_eq!(witness.to_string(), "[sig(02ff), preimage(0a), <>]");
    assert_eq!(WitnessKind::Threshold.to_string(), "threshold");
    assert!(Witness::default().is_empty());
}
