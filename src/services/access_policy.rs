//! Política de acceso por rol
//!
//! Cada vista protegida declara su lista de roles permitidos. Un acceso
//! denegado nunca llega al handler: se redirige a la ubicación por defecto
//! del rol.

use serde::Serialize;

use crate::models::auth::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Jobs,
    JobPosting,
    Bidding,
    Delivery,
    Invoices,
    OwnerAnalytics,
    Admin,
    Portal,
}

const EVERYONE: &[Role] = &Role::ALL;
const COMPANY_ROLES: &[Role] = &[Role::Broker, Role::Driver, Role::Company];
const POSTERS: &[Role] = &[Role::Broker, Role::Driver, Role::Company, Role::Owner, Role::Admin];
const FIELD_ROLES: &[Role] = &[Role::Driver, Role::Mobile, Role::Admin];
const BACK_OFFICE: &[Role] = &[Role::Admin, Role::Owner];
const PORTAL_ROLES: &[Role] = &[Role::Broker, Role::Driver, Role::Company, Role::Admin];

impl View {
    pub const ALL: [View; 8] = [
        View::Jobs,
        View::JobPosting,
        View::Bidding,
        View::Delivery,
        View::Invoices,
        View::OwnerAnalytics,
        View::Admin,
        View::Portal,
    ];

    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            View::Jobs => EVERYONE,
            View::JobPosting => POSTERS,
            View::Bidding => COMPANY_ROLES,
            View::Delivery => FIELD_ROLES,
            View::Invoices => BACK_OFFICE,
            View::OwnerAnalytics => &[Role::Owner],
            View::Admin => &[Role::Admin],
            View::Portal => PORTAL_ROLES,
        }
    }
}

pub fn can_access(view: View, role: Role) -> bool {
    view.allowed_roles().contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_analytics_is_owner_only() {
        for role in Role::ALL {
            assert_eq!(can_access(View::OwnerAnalytics, role), role == Role::Owner);
        }
    }

    #[test]
    fn test_every_role_sees_jobs() {
        assert!(Role::ALL.iter().all(|r| can_access(View::Jobs, *r)));
    }

    #[test]
    fn test_policy_table() {
        assert!(can_access(View::Delivery, Role::Driver));
        assert!(can_access(View::Delivery, Role::Mobile));
        assert!(!can_access(View::Delivery, Role::Broker));
        assert!(can_access(View::Bidding, Role::Company));
        assert!(!can_access(View::Bidding, Role::Admin));
        assert!(can_access(View::Invoices, Role::Owner));
        assert!(!can_access(View::Invoices, Role::Company));
        assert!(!can_access(View::Portal, Role::Mobile));
    }

    #[test]
    fn test_every_view_admits_someone() {
        assert!(View::ALL.iter().all(|v| !v.allowed_roles().is_empty()));
    }
}
