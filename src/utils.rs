use argon2::{
    password_hash::{
        rand_core::OsRng, Error, PasswordHasher, SaltString
    }, Argon2, PasswordHash, PasswordVerifier
};
use subtle::ConstantTimeEq;

/// Argon2id PHC string for `ADMIN_PASSWORD_HASH`.
pub fn hash_password(password:&str)->Result<String, Error>{

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2.hash_password(password.as_bytes(), salt.as_salt())?.to_string();
    Ok(password_hash)
}

pub fn verify_password(password:&str, hash:&str)->Result<(), Error>{

    let argon2 = Argon2::default();
    let parsed_hash = PasswordHash::new(hash)?;
    argon2.verify_password(password.as_bytes(), &parsed_hash)?;

    Ok(())
}

/// Byte comparison that does not stop at the first mismatch.
pub fn constant_time_eq(a:&[u8], b:&[u8])->bool{
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn hashed_password_verifies(){
        let hash = hash_password("sinha123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("sinha123", &hash).is_ok());
        assert!(verify_password("wrong", &hash).is_err());
    }

    #[test]
    fn constant_time_eq_matches_plain_equality(){
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secrets"));
    }
}
