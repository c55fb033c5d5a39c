//! S3-compatible binding of [`ObjectClient`].
//!
//! Aliyun OSS and most other object stores speak the S3 protocol, so the
//! `oss` driver talks to them through `aws-sdk-s3` pointed at a custom
//! endpoint.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream as SdkByteStream;
use aws_sdk_s3::types::{Delete, Grant, ObjectCannedAcl, ObjectIdentifier, Permission};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use futures::stream;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use ossdisk_common::{Acl, Error, ObjectMetadata, Result};

use crate::adapter::ByteStream;
use crate::client::{ObjectClient, ObjectListing, ObjectSummary, PutOptions};
use crate::oss::OssConfig;

/// Grantee URI of the anonymous group.
const ALL_USERS: &str = "http://acs.amazonaws.com/groups/global/AllUsers";

/// Keys per `DeleteObjects` request.
const DELETE_BATCH: usize = 1000;

/// Characters left unescaped in `x-amz-copy-source`.
const COPY_SOURCE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build an S3 client from driver configuration.
///
/// Credentials are static; nothing is contacted until the first request.
pub fn build_client(config: &OssConfig) -> Client {
    let credentials = Credentials::new(
        config.access_id.clone(),
        config.access_key.expose().to_string(),
        None,
        None,
        "ossdisk",
    );

    let conf = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .credentials_provider(credentials)
        .region(Region::new(config.region.clone()))
        .endpoint_url(endpoint_url(&config.endpoint))
        .force_path_style(config.path_style)
        .build();

    Client::from_conf(conf)
}

/// Endpoints are commonly configured without a scheme.
fn endpoint_url(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}

fn copy_source(bucket: &str, key: &str) -> String {
    utf8_percent_encode(&format!("{}/{}", bucket, key), COPY_SOURCE).to_string()
}

fn canned_acl(acl: Acl) -> ObjectCannedAcl {
    match acl {
        Acl::Private => ObjectCannedAcl::Private,
        Acl::PublicRead => ObjectCannedAcl::PublicRead,
        Acl::PublicReadWrite => ObjectCannedAcl::PublicReadWrite,
        Acl::Default => ObjectCannedAcl::from(Acl::Default.as_str()),
    }
}

/// Collapse the grants of an ACL into the canned vocabulary by looking at
/// what anonymous users may do.
///
/// Never yields [`Acl::Default`]: S3 object ACLs carry no "inherit from
/// bucket" marker, so an object readable only through a public bucket
/// policy or bucket ACL reads as [`Acl::Private`] here.
fn acl_from_grants(grants: &[Grant]) -> Acl {
    let mut acl = Acl::Private;

    for grant in grants {
        let anonymous = grant
            .grantee()
            .and_then(|grantee| grantee.uri())
            .map(|uri| uri == ALL_USERS)
            .unwrap_or(false);
        if !anonymous {
            continue;
        }

        match grant.permission() {
            Some(Permission::Write) | Some(Permission::FullControl) => {
                return Acl::PublicReadWrite;
            }
            Some(Permission::Read) => acl = Acl::PublicRead,
            _ => {}
        }
    }

    acl
}

fn to_utc(time: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
    time.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
        .unwrap_or_default()
}

fn remote<E>(op: &str, key: &str, err: E) -> Error
where
    E: std::error::Error,
{
    Error::Remote(format!(
        "failed to {} at: {}, {}",
        op,
        key,
        DisplayErrorContext(err)
    ))
}

fn body_stream(body: SdkByteStream, key: String) -> ByteStream {
    let chunks = stream::unfold(Some(body), move |body| {
        let key = key.clone();
        async move {
            let mut body = body?;
            match body.next().await {
                Some(Ok(bytes)) => Some((Ok(bytes.to_vec()), Some(body))),
                Some(Err(err)) => Some((Err(remote("read body", &key, err)), None)),
                None => None,
            }
        }
    });
    Box::pin(chunks)
}

#[async_trait]
impl ObjectClient for Client {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        options: PutOptions,
    ) -> Result<()> {
        self.put_object()
            .bucket(bucket)
            .key(key)
            .body(SdkByteStream::from(body))
            .set_content_type(options.content_type)
            .set_content_md5(options.content_md5)
            .set_acl(options.acl.map(canned_acl))
            .send()
            .await
            .map_err(|err| remote("put_object", key, err))?;

        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote("get_object", key, err))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|err| remote("collect body", key, err))?;

        Ok(bytes.into_bytes().to_vec())
    }

    async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ByteStream> {
        let output = self
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote("get_object", key, err))?;

        Ok(body_stream(output.body, key.to_string()))
    }

    async fn copy_object(&self, bucket: &str, from: &str, to: &str) -> Result<()> {
        self.copy_object()
            .bucket(bucket)
            .copy_source(copy_source(bucket, from))
            .key(to)
            .send()
            .await
            .map_err(|err| remote("copy_object", from, err))?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote("delete_object", key, err))?;

        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Err(Error::Remote(format!(
                "failed to delete_objects at: {}, no keys given",
                bucket
            )));
        }

        for batch in keys.chunks(DELETE_BATCH) {
            let objects = batch
                .iter()
                .map(|key| {
                    ObjectIdentifier::builder()
                        .key(key)
                        .build()
                        .map_err(|err| remote("delete_objects", key, err))
                })
                .collect::<Result<Vec<_>>>()?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|err| remote("delete_objects", bucket, err))?;

            let output = self
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|err| remote("delete_objects", bucket, err))?;

            if let Some(failed) = output.errors().first() {
                return Err(Error::Remote(format!(
                    "failed to delete_objects at: {}, {} keys rejected, first: {} ({})",
                    bucket,
                    output.errors().len(),
                    failed.key().unwrap_or(""),
                    failed.message().unwrap_or("no message"),
                )));
            }
        }

        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
    ) -> Result<ObjectListing> {
        let mut listing = ObjectListing::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut req = self.list_objects_v2().bucket(bucket).prefix(prefix);

            if !delimiter.is_empty() {
                req = req.delimiter(delimiter);
            }
            if let Some(tok) = continuation_token {
                req = req.continuation_token(tok);
            }

            let lo = req
                .send()
                .await
                .map_err(|err| remote("list_objects", prefix, err))?;

            for o in lo.contents() {
                listing.objects.push(ObjectSummary {
                    key: o.key().unwrap_or("").to_string(),
                    size: o.size().unwrap_or(0).max(0) as u64,
                    last_modified: to_utc(o.last_modified()),
                });
            }

            for p in lo.common_prefixes() {
                if let Some(prefix) = p.prefix() {
                    listing.prefixes.push(prefix.to_string());
                }
            }

            continuation_token = lo.next_continuation_token().map(|tok| tok.to_string());
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(listing)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let ho = self
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote("head_object", key, err))?;

        Ok(ObjectMetadata {
            content_length: ho.content_length().unwrap_or(0).max(0) as u64,
            content_type: ho
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string(),
            last_modified: to_utc(ho.last_modified()),
            etag: ho.e_tag().map(|tag| tag.trim_matches('"').to_string()),
        })
    }

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<Acl> {
        let output = self
            .get_object_acl()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote("get_object_acl", key, err))?;

        Ok(acl_from_grants(output.grants()))
    }

    async fn put_object_acl(&self, bucket: &str, key: &str, acl: Acl) -> Result<()> {
        self.put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(canned_acl(acl))
            .send()
            .await
            .map_err(|err| remote("put_object_acl", key, err))?;

        Ok(())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(false);
                    }
                }

                Err(remote("head_object", key, err))
            }
        }
    }
}
