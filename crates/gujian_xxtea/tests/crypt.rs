use gujian_xxtea::error::{Error, Result};
use gujian_xxtea::{CipherKey, KeyTable, Xxtea};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

const TABLE: &str = concat!(
    "# per-file keys\n",
    "config/items.dat\t8f1c2d3e4a5b6c7d8e9f0a1b2c3d4e5f60718293\n",
);

#[traced_test]
#[test]
fn table_key_round_trip() -> Result<()> {
    let table = KeyTable::parse(TABLE)?;
    let cipher = Xxtea::for_path(&table, "Data/Config/Items.dat");
    assert!(cipher.key().is_some());

    let original: Vec<u8> = (0..1027u32).map(|i| (i % 251) as u8).collect();
    let mut data = original.clone();

    cipher.encrypt(&mut data)?;
    assert_ne!(data, original);

    cipher.decrypt(&mut data)?;
    assert_eq!(data, original);

    Ok(())
}

#[traced_test]
#[test]
fn unresolved_path_fails_on_first_use() -> Result<()> {
    let table = KeyTable::parse(TABLE)?;
    let cipher = Xxtea::for_path(&table, "Data/Config/unknown.dat");

    let mut data = vec![1, 2, 3, 4, 5, 6, 7, 8];
    assert!(matches!(cipher.decrypt(&mut data), Err(Error::UninitializedKey)));

    Ok(())
}

#[test]
fn different_keys_give_different_output() -> Result<()> {
    let first = Xxtea::with_key(CipherKey::from_secret("0123456789abcdef")?);
    let second = Xxtea::with_key(CipherKey::from_secret("fedcba9876543210")?);

    let mut a = vec![0u8; 512];
    let mut b = vec![0u8; 512];
    first.encrypt(&mut a)?;
    second.encrypt(&mut b)?;

    assert_ne!(a, b);
    Ok(())
}
