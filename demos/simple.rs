use bike_kem::{decap, encap, keypair, Ciphertext, PublicKey, SecretKey};

fn main() {
    let mut rng = rand::thread_rng();

    // Generate a keypair
    let (sk, pk) = keypair(&mut rng).expect("keypair generation failed");

    // Serialize the secret key, maybe to save on disk
    let mut sk_bytes = [0u8; SecretKey::SERIALIZED_LEN];
    sk.to_bytes(&mut sk_bytes);

    // Deserialize the secret key
    let sk = SecretKey::from_bytes(&sk_bytes);

    // Also serialize and deserialize the public key
    let mut pk_bytes = [0u8; PublicKey::SERIALIZED_LEN];
    pk.to_bytes(&mut pk_bytes);
    let pk = PublicKey::from_bytes(&pk_bytes);

    // Encapsulate a shared secret, ss1, to pk
    let (ct, ss1) = encap(&mut rng, &pk).expect("encapsulation failed");

    // Ship the ciphertext as bytes and deserialize on the receiving side
    let mut ct_bytes = [0u8; Ciphertext::SERIALIZED_LEN];
    ct.to_bytes(&mut ct_bytes);
    let receiver_ct = Ciphertext::from_bytes(&ct_bytes);

    // Use the secret key to decapsulate the ciphertext
    let ss2 = decap(&sk, &receiver_ct).expect("decapsulation failed");

    // Check the shared secrets are equal. NOTE this is not a constant-time
    // check (ie not secure). We only do this for demonstration purposes.
    assert_eq!(ss1, ss2);

    println!("KEM ran successfully");
}
