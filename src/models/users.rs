#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsersRow {
    pub user_id: String,
    pub full_name: String,
    pub role: String,
    pub parent_id: Option<String>,
}

/// Roles are assigned by the external identity provider; a user holds exactly
/// one, and parent/child is a foreign-key relation, not a subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Teacher,
    Parent,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Teacher => "Teacher",
            Role::Parent => "Parent",
            Role::Student => "Student",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "Admin" => Some(Role::Admin),
            "Teacher" => Some(Role::Teacher),
            "Parent" => Some(Role::Parent),
            "Student" => Some(Role::Student),
            _ => None,
        }
    }
}
