use std::io::Cursor;

use file_vault::crypto::Envelope;
use file_vault::storage::Payload;
use file_vault::vault::{UploadEncryption, UploadRequest, VerifyOutcome};
use file_vault::{ContentDigest, FileRecord, StorageSummary, Vault, VaultConfig, VaultError};
use rocket::form::{self, DataField, Form, FromFormField, ValueField};
use rocket::fs::TempFile;
use rocket::http::{ContentType, Status};
use rocket::request::{self, FromRequest, Outcome};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::tokio::io::AsyncReadExt;
use rocket::{delete, get, post, FromForm, Request, Response, State};
use serde::Serialize;

use crate::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

/// The acting identity. There is no authentication; every request is the
/// configured placeholder owner.
pub struct Caller(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.rocket().state::<VaultConfig>() {
            Some(config) => Outcome::Success(Caller(config.owner_id.clone())),
            None => Outcome::Error((Status::InternalServerError, ())),
        }
    }
}

/// A multipart file part. Rocket hands parts without a `Content-Type` over as
/// lossily decoded text, so those are refused instead of stored.
pub struct UploadedFile<'r>(TempFile<'r>);

#[rocket::async_trait]
impl<'r> FromFormField<'r> for UploadedFile<'r> {
    fn from_value(_field: ValueField<'r>) -> form::Result<'r, Self> {
        Err(form::Error::validation(
            "file part must be sent as binary data with a Content-Type",
        ))?
    }

    async fn from_data(field: DataField<'r, '_>) -> form::Result<'r, Self> {
        Ok(UploadedFile(TempFile::from_data(field).await?))
    }
}

#[derive(FromForm)]
pub struct UploadForm<'r> {
    file: form::Result<'r, UploadedFile<'r>>,
    encrypted: Option<&'r str>,
    password: Option<&'r str>,
    iv: Option<&'r str>,
    salt: Option<&'r str>,
    hash: Option<&'r str>,
    #[field(name = "zeroKnowledge")]
    zero_knowledge: Option<&'r str>,
}

#[derive(FromForm)]
pub struct VerifyForm<'r> {
    file: form::Result<'r, UploadedFile<'r>>,
}

fn parse_flag(field: &str, value: Option<&str>) -> Result<bool, VaultError> {
    match value.map(str::trim) {
        None | Some("") | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(VaultError::Validation(format!(
            "Invalid {} flag {:?}, expected \"true\" or \"false\"",
            field, other
        ))),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl UploadForm<'_> {
    fn encryption(&self) -> Result<UploadEncryption, VaultError> {
        let encrypted = parse_flag("encrypted", self.encrypted)?;
        let zero_knowledge = parse_flag("zeroKnowledge", self.zero_knowledge)?;
        if !encrypted {
            return Ok(UploadEncryption::None);
        }

        match (non_empty(self.iv), non_empty(self.salt), non_empty(self.password)) {
            // Already encrypted by the client. A transmitted password is not kept.
            (Some(iv), Some(salt), _) => Ok(UploadEncryption::Client {
                envelope: Envelope::from_wire(iv, salt)?,
                plaintext_digest: non_empty(self.hash).map(ContentDigest::from_hex).transpose()?,
                zero_knowledge,
            }),
            (Some(_), None, _) | (None, Some(_), _) => Err(VaultError::Validation(
                "Both iv and salt are required for client-side encrypted uploads".to_string(),
            )),
            // A zero-knowledge password never leaves the client.
            (None, None, Some(_)) if zero_knowledge => Err(VaultError::Validation(
                "Zero-knowledge uploads must be encrypted client-side with iv and salt".to_string(),
            )),
            (None, None, Some(password)) => Ok(UploadEncryption::Server {
                password: password.to_string(),
            }),
            (None, None, None) => Err(VaultError::Validation(
                "Encrypted uploads need iv and salt, or a password".to_string(),
            )),
        }
    }
}

async fn read_upload(file: &TempFile<'_>) -> ApiResult<Vec<u8>> {
    let mut data = Vec::with_capacity(file.len() as usize);
    let reader = file.open().await?;
    rocket::tokio::pin!(reader);
    reader.read_to_end(&mut data).await?;
    Ok(data)
}

fn upload_name(file: &TempFile<'_>) -> String {
    file.raw_name()
        .map(|name| name.dangerous_unsafe_unsanitized_raw().as_str().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "upload".to_string())
}

#[get("/files")]
pub async fn list_files(vault: &State<Vault>, caller: Caller) -> ApiResult<Json<Vec<FileRecord>>> {
    Ok(Json(vault.list(&caller.0).await?))
}

#[get("/files/stats")]
pub async fn file_stats(vault: &State<Vault>, caller: Caller) -> ApiResult<Json<StorageSummary>> {
    Ok(Json(vault.summary(&caller.0).await?))
}

#[post("/files", data = "<form>")]
pub async fn upload_file(
    form: Form<UploadForm<'_>>,
    vault: &State<Vault>,
    caller: Caller,
) -> ApiResult<Json<FileRecord>> {
    let form = form.into_inner();
    let file = match &form.file {
        Ok(UploadedFile(file)) => file,
        Err(errors) => return Err(ApiError::from_form("file", errors)),
    };
    let encryption = form.encryption()?;

    let request = UploadRequest {
        name: upload_name(file),
        content_type: file.content_type().map(|ct| ct.to_string()),
        data: read_upload(file).await?,
        encryption,
    };
    Ok(Json(vault.upload(request, &caller.0).await?))
}

#[post("/files/verify", data = "<form>")]
pub async fn verify_file(form: Form<VerifyForm<'_>>, vault: &State<Vault>) -> ApiResult<Json<VerifyOutcome>> {
    let form = form.into_inner();
    let file = match &form.file {
        Ok(UploadedFile(file)) => file,
        Err(errors) => return Err(ApiError::from_form("file", errors)),
    };
    let data = read_upload(file).await?;
    Ok(Json(vault.verify(data).await?))
}

#[derive(Serialize)]
pub struct Deleted {
    success: bool,
}

/// Path ids that are not a record id name nothing, so they answer 404 like an absent record.
fn parse_id(id: &str) -> Result<u64, VaultError> {
    id.parse()
        .map_err(|_| VaultError::NotFound("File not found".to_string()))
}

#[delete("/files/<id>")]
pub async fn delete_file(id: &str, vault: &State<Vault>, caller: Caller) -> ApiResult<Json<Deleted>> {
    vault.delete(parse_id(id)?, &caller.0).await?;
    Ok(Json(Deleted { success: true }))
}

/// Raw stored bytes. Encrypted payloads carry their envelope in headers.
pub struct StoredContent {
    record: FileRecord,
    payload: Payload,
}

impl<'r> Responder<'r, 'static> for StoredContent {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        let mut response = Response::build();
        response
            .header(ContentType::Binary)
            .raw_header("X-Vault-Hash", self.record.hash.to_hex());
        if let Some(envelope) = self.payload.envelope {
            response
                .raw_header("X-Vault-Iv", envelope.iv_wire())
                .raw_header("X-Vault-Salt", envelope.salt_wire());
        }
        let data = self.payload.data;
        response.sized_body(data.len(), Cursor::new(data)).ok()
    }
}

#[get("/files/<id>/content")]
pub async fn file_content(id: &str, vault: &State<Vault>, caller: Caller) -> ApiResult<StoredContent> {
    let (record, payload) = vault.content(parse_id(id)?, &caller.0).await?;
    Ok(StoredContent { record, payload })
}
