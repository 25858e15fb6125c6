//! Runtime SQL queries for signing state

use crate::models::{CertificateRow, SignaturePartRow, SigningStateRow};
use pkgsig_errors::Error;
use pkgsig_types::{PackageKey, SignatureRecord, SigningClassification, Thumbprint};
use sqlx::{query, query_as, Sqlite, Transaction};

/// Insert a trusted certificate, replacing subject and key of an existing one
pub async fn upsert_certificate(
    tx: &mut Transaction<'_, Sqlite>,
    thumbprint: &Thumbprint,
    subject: Option<&str>,
    public_key: &str,
) -> Result<(), Error> {
    let now = chrono::Utc::now().timestamp();

    query(
        "INSERT INTO trusted_certificates (thumbprint, subject, public_key, added_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(thumbprint) DO UPDATE SET
             subject = excluded.subject,
             public_key = excluded.public_key",
    )
    .bind(thumbprint.as_str())
    .bind(subject)
    .bind(public_key)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Delete a trusted certificate, returning whether a row was removed
pub async fn delete_certificate(
    tx: &mut Transaction<'_, Sqlite>,
    thumbprint: &Thumbprint,
) -> Result<bool, Error> {
    let result = query("DELETE FROM trusted_certificates WHERE thumbprint = ?1")
        .bind(thumbprint.as_str())
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All trusted certificates, oldest first
pub async fn list_certificates(
    tx: &mut Transaction<'_, Sqlite>,
) -> Result<Vec<CertificateRow>, Error> {
    let rows = query_as::<_, CertificateRow>(
        "SELECT thumbprint, subject, public_key, added_at
         FROM trusted_certificates
         ORDER BY added_at, thumbprint",
    )
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}

/// Record the signing classification of a package
pub async fn upsert_signing_state(
    tx: &mut Transaction<'_, Sqlite>,
    package_key: PackageKey,
    package_id: &str,
    package_version: &str,
    classification: SigningClassification,
) -> Result<(), Error> {
    let now = chrono::Utc::now().timestamp();

    query(
        "INSERT INTO package_signing_states
             (package_key, package_id, package_version, status, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(package_key) DO UPDATE SET
             package_id = excluded.package_id,
             package_version = excluded.package_version,
             status = excluded.status,
             updated_at = excluded.updated_at",
    )
    .bind(package_key)
    .bind(package_id)
    .bind(package_version)
    .bind(classification.as_str())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Get the signing state of a package
pub async fn get_signing_state(
    tx: &mut Transaction<'_, Sqlite>,
    package_key: PackageKey,
) -> Result<Option<SigningStateRow>, Error> {
    let row = query_as::<_, SigningStateRow>(
        "SELECT package_key, package_id, package_version, status, updated_at
         FROM package_signing_states WHERE package_key = ?1",
    )
    .bind(package_key)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row)
}

/// Store one extracted signature of a package; an identical signature is stored once per package
pub async fn insert_signature_part(
    tx: &mut Transaction<'_, Sqlite>,
    package_key: PackageKey,
    record: &SignatureRecord,
) -> Result<bool, Error> {
    let now = chrono::Utc::now().timestamp();

    let result = query(
        "INSERT OR IGNORE INTO package_signatures
             (package_key, thumbprint, trusted_comment, signature, extracted_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(package_key)
    .bind(record.thumbprint.as_str())
    .bind(record.trusted_comment.as_deref())
    .bind(record.encoded.as_str())
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Extracted signatures made by one certificate
pub async fn signature_parts_for(
    tx: &mut Transaction<'_, Sqlite>,
    thumbprint: &Thumbprint,
) -> Result<Vec<SignaturePartRow>, Error> {
    let rows = query_as::<_, SignaturePartRow>(
        "SELECT id, package_key, thumbprint, trusted_comment, signature, extracted_at
         FROM package_signatures WHERE thumbprint = ?1
         ORDER BY id",
    )
    .bind(thumbprint.as_str())
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}

/// Extracted signatures of one package
pub async fn signature_parts_of_package(
    tx: &mut Transaction<'_, Sqlite>,
    package_key: PackageKey,
) -> Result<Vec<SignaturePartRow>, Error> {
    let rows = query_as::<_, SignaturePartRow>(
        "SELECT id, package_key, thumbprint, trusted_comment, signature, extracted_at
         FROM package_signatures WHERE package_key = ?1
         ORDER BY id",
    )
    .bind(package_key)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rows)
}
