// # Registrar Trait
//
// Defines the interface for reading and mutating DNS records through a
// domain registrar's API.
//
// ## Implementations
//
// - Internet.bs: `dnsmig-provider-internetbs` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsmig_core::Registrar;
//
// async fn show(registrar: &dyn Registrar) -> dnsmig_core::Result<()> {
//     for domain in registrar.list_domains().await? {
//         let records = registrar.list_records(&domain).await?;
//         println!("{}: {} record(s)", domain, records.len());
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::record::{ApiStatus, DnsRecord};

/// Trait for registrar API implementations
///
/// Implementations translate the registrar's response shapes into the types
/// of this crate. Anything vendor-specific (parameter names, alternative
/// response keys, status conventions) stays behind this trait.
///
/// # Thread Safety
///
/// Implementations are shared by every domain task through an `Arc`, so
/// they must be `Send + Sync`.
///
/// # Failure Semantics
///
/// Every method returns `Err` for transport failures, non-success HTTP
/// statuses and unreadable bodies. Deciding whether such a failure is fatal
/// or merely degrades to "no data" belongs to the caller:
/// the upfront domain listing is fatal, everything per-domain is not.
///
/// Implementations must not retry. A mutation the server rejected is not an
/// `Err`; it is an [`ApiStatus`] whose status is not `SUCCESS`.
#[async_trait]
pub trait Registrar: Send + Sync {
    /// List every domain owned by the account
    ///
    /// An empty vector means the account has no domains.
    async fn list_domains(&self) -> Result<Vec<String>, crate::Error>;

    /// List every DNS record of `domain`, in server order, unfiltered
    async fn list_records(&self, domain: &str) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Remove the record identified by its full name and type
    async fn remove_record(
        &self,
        full_name: &str,
        record_type: &str,
    ) -> Result<ApiStatus, crate::Error>;

    /// Add a record
    async fn add_record(
        &self,
        full_name: &str,
        record_type: &str,
        value: &str,
        ttl: u32,
    ) -> Result<ApiStatus, crate::Error>;

    /// Get the registrar name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing registrars from configuration
pub trait RegistrarFactory: Send + Sync {
    /// Create a Registrar instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn Registrar>, crate::Error>;
}
