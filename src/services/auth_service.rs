use crate::{
    database::UserStore,
    models::{normalize_email, SessionUser, User},
    utils::AppError,
};
use bcrypt::{hash, verify};

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// User registration
pub async fn register(
    users: &dyn UserStore,
    request: &RegisterRequest,
    bcrypt_cost: u32,
) -> Result<User, AppError> {
    let name = request.name.trim();
    let email = normalize_email(&request.email);

    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }

    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Validation(
            "This email is already registered".to_string(),
        ));
    }

    let password_hash = hash(&request.password, bcrypt_cost)?;
    let user = User::new(name.to_string(), email, password_hash);

    // The store re-checks uniqueness; two racing registrations cannot both land
    users.insert_user(&user).await?;

    Ok(user)
}

// User login
pub async fn login(users: &dyn UserStore, request: &LoginRequest) -> Result<SessionUser, AppError> {
    let email = normalize_email(&request.email);

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // A corrupt stored hash is reported like a wrong password
    let valid = verify(&request.password, &user.password_hash).unwrap_or_else(|e| {
        log::error!("❌ Stored password hash for {} is unreadable: {}", email, e);
        false
    });

    if !valid {
        return Err(AppError::InvalidCredentials);
    }

    Ok(SessionUser {
        user_id: user.id,
        user_name: user.name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    const COST: u32 = 4;

    fn ada() -> RegisterRequest {
        RegisterRequest {
            name: "Ada".into(),
            email: "Ada@Example.com".into(),
            password: "analytical-engine".into(),
        }
    }

    #[tokio::test]
    async fn stores_normalized_email_and_hash() {
        let store = MemoryStore::new();
        let user = register(&store, &ada(), COST).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "analytical-engine");
        assert!(verify("analytical-engine", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_in_any_case_is_rejected() {
        let store = MemoryStore::new();
        register(&store, &ada(), COST).await.unwrap();

        let again = RegisterRequest {
            email: " ADA@example.COM ".into(),
            ..ada()
        };
        assert!(matches!(
            register(&store, &again, COST).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let store = MemoryStore::new();
        let blank = RegisterRequest {
            password: String::new(),
            ..ada()
        };
        assert!(matches!(
            register(&store, &blank, COST).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn login_needs_the_exact_password() {
        let store = MemoryStore::new();
        let user = register(&store, &ada(), COST).await.unwrap();

        let ok = login(
            &store,
            &LoginRequest {
                email: "ada@example.com".into(),
                password: "analytical-engine".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(ok.user_id, user.id);
        assert_eq!(ok.user_name, "Ada");

        for wrong in ["Analytical-engine", "analytical-engine ", ""] {
            let res = login(
                &store,
                &LoginRequest {
                    email: "ada@example.com".into(),
                    password: wrong.into(),
                },
            )
            .await;
            assert!(matches!(res, Err(AppError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn unknown_email_fails_like_a_wrong_password() {
        let store = MemoryStore::new();
        let res = login(
            &store,
            &LoginRequest {
                email: "nobody@example.com".into(),
                password: "x".into(),
            },
        )
        .await;
        assert!(matches!(res, Err(AppError::InvalidCredentials)));
    }
}
