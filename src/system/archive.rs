// Archive backend - 형식 감지, 엔트리 나열, 압축 해제
//
// 모든 오류는 ArcpeekError 로 정규화되며 비밀번호 관련 실패는
// ArchivePasswordRequired / ArchiveInvalidPassword 로 구분된다.

use crate::core::tree::build_tree;
use crate::models::archive_entry::{parent_of, ArchiveEntry, TreeNode};
use crate::utils::error::{ArcpeekError, Result};
use bzip2::read::BzDecoder;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use flate2::read::GzDecoder;
use sevenz_rust2::Error as SevenZError;
use sevenz_rust2::Password as SevenZPassword;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tar::Archive as TarArchive;
use tracing::debug;
use unrar::error::{Code as RarCode, UnrarError};
use xz2::read::XzDecoder;
use zip::result::ZipError;
use zip::ZipArchive;
use zstd::stream::read::Decoder as ZstdDecoder;

/// macOS 리소스 포크 디렉토리 (나열/해제 모두 제외)
const MACOS_METADATA_PREFIX: &str = "__MACOSX";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    TarGz,
    TarBz2,
    TarXz,
    TarZst,
    SevenZ,
    Rar,
}

impl ArchiveFormat {
    pub fn display_name(&self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::TarBz2 => "tar.bz2",
            ArchiveFormat::TarXz => "tar.xz",
            ArchiveFormat::TarZst => "tar.zst",
            ArchiveFormat::SevenZ => "7z",
            ArchiveFormat::Rar => "rar",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArchiveExtractRequest {
    pub archive_path: PathBuf,
    pub dest_dir: PathBuf,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub total_files: usize,
    pub items_processed: usize,
    pub items_failed: usize,
    pub errors: Vec<String>,
    pub cancelled: bool,
}

impl ArchiveSummary {
    fn new(total_files: usize) -> Self {
        Self {
            total_files,
            items_processed: 0,
            items_failed: 0,
            errors: Vec::new(),
            cancelled: false,
        }
    }

    fn fail(&mut self, name: &str, reason: impl std::fmt::Display) {
        self.items_processed += 1;
        self.items_failed += 1;
        self.errors.push(format!("{}: {}", name, reason));
    }
}

/// 방금 기록된 엔트리 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveProgressEvent {
    pub entry: String,
    pub files_completed: usize,
    pub total_files: usize,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    List,
    Extract,
}

pub fn detect_archive_format(path: &Path) -> Option<ArchiveFormat> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    let table: &[(&[&str], ArchiveFormat)] = &[
        (&[".tar.gz", ".tgz"], ArchiveFormat::TarGz),
        (&[".tar.bz2", ".tbz2", ".tbz"], ArchiveFormat::TarBz2),
        (&[".tar.xz", ".txz"], ArchiveFormat::TarXz),
        (&[".tar.zst", ".tzst"], ArchiveFormat::TarZst),
        (&[".tar"], ArchiveFormat::Tar),
        (&[".zip"], ArchiveFormat::Zip),
        (&[".7z"], ArchiveFormat::SevenZ),
        (&[".rar"], ArchiveFormat::Rar),
    ];
    table
        .iter()
        .find(|(suffixes, _)| suffixes.iter().any(|s| name.ends_with(s)))
        .map(|(_, format)| *format)
}

fn require_format(path: &Path) -> Result<ArchiveFormat> {
    detect_archive_format(path).ok_or_else(|| ArcpeekError::ArchiveUnsupportedFormat {
        path: path.display().to_string(),
    })
}

/// 평탄한 엔트리 목록 (__MACOSX 제외, 입력 순서 유지)
pub fn list_entries(path: &Path, password: Option<&str>) -> Result<Vec<ArchiveEntry>> {
    let format = require_format(path)?;
    debug!(archive = %path.display(), format = format.display_name(), "listing entries");
    let entries = match format {
        ArchiveFormat::Zip => list_zip_entries(path, password)?,
        ArchiveFormat::SevenZ => list_7z_entries(path, password)?,
        ArchiveFormat::Rar => list_rar_entries(path, password)?,
        _ => list_tar_like_entries(open_tar(path, format)?, path)?,
    };
    Ok(entries
        .into_iter()
        .filter(|e| !is_macos_metadata(&e.path))
        .collect())
}

/// 엔트리 나열 + 누락 디렉토리 보충 + 계층 조립
pub fn read_listing(path: &Path, password: Option<&str>) -> Result<Vec<TreeNode<ArchiveEntry>>> {
    let entries = fill_missing_directories(list_entries(path, password)?);
    let build = build_tree(entries);
    if !build.issues.is_empty() {
        debug!(
            archive = %path.display(),
            issues = build.issues.len(),
            "listing assembled with hierarchy fallbacks"
        );
    }
    Ok(build.roots)
}

/// 명시되지 않은 중간 디렉토리를 합성하고 같은 경로의 중복을 제거한다.
/// 합성된 디렉토리는 처음 필요로 한 엔트리 바로 앞에 들어간다.
pub fn fill_missing_directories(entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    let mut seen: HashSet<String> = HashSet::with_capacity(entries.len());
    let explicit: HashSet<String> = entries.iter().map(|e| e.key().to_string()).collect();
    let mut out = Vec::with_capacity(entries.len());

    for entry in entries {
        let key = entry.key().to_string();
        let mut prefix = String::new();
        let segments: Vec<&str> = key.split('/').filter(|s| !s.is_empty()).collect();
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if explicit.contains(&prefix) || !seen.insert(prefix.clone()) {
                continue;
            }
            out.push(ArchiveEntry {
                name: String::new(),
                path: format!("{}/", prefix),
                parent_path: parent_of(&prefix),
                size: 0,
                is_dir: true,
                modified: None,
            });
        }
        if seen.insert(key) {
            out.push(entry);
        }
    }
    out
}

pub fn extract_archive(
    request: &ArchiveExtractRequest,
    progress_tx: Sender<ArchiveProgressEvent>,
    cancel_flag: Arc<AtomicBool>,
) -> Result<ArchiveSummary> {
    let format = require_format(&request.archive_path)?;

    if request.dest_dir.exists() && !request.dest_dir.is_dir() {
        return Err(ArcpeekError::ArchiveExtractFailed {
            path: request.archive_path.display().to_string(),
            reason: format!(
                "Destination is not a directory: {}",
                request.dest_dir.display()
            ),
        });
    }
    fs::create_dir_all(&request.dest_dir)?;

    // 비밀번호 오류를 쓰기 전에 드러내고 진행률 분모를 구한다
    let total_files = list_entries(&request.archive_path, request.password.as_deref())?.len();
    let mut ctx = ExtractContext {
        request,
        progress_tx: &progress_tx,
        cancel_flag: &cancel_flag,
        summary: ArchiveSummary::new(total_files),
        files_completed: 0,
    };

    match format {
        ArchiveFormat::Zip => extract_zip_archive(&mut ctx)?,
        ArchiveFormat::SevenZ => extract_7z_archive(&mut ctx)?,
        ArchiveFormat::Rar => extract_rar_archive(&mut ctx)?,
        _ => {
            let archive = open_tar(&request.archive_path, format)?;
            extract_tar_like_archive(archive, &mut ctx)?
        }
    }

    Ok(ctx.summary)
}

struct ExtractContext<'a> {
    request: &'a ArchiveExtractRequest,
    progress_tx: &'a Sender<ArchiveProgressEvent>,
    cancel_flag: &'a Arc<AtomicBool>,
    summary: ArchiveSummary,
    files_completed: usize,
}

impl ExtractContext<'_> {
    fn cancelled(&mut self) -> bool {
        if self.cancel_flag.load(Ordering::Relaxed) {
            self.summary.cancelled = true;
        }
        self.summary.cancelled
    }

    fn completed(&mut self, name: String) {
        self.files_completed += 1;
        self.summary.items_processed += 1;
        let _ = self.progress_tx.send(ArchiveProgressEvent {
            entry: name,
            files_completed: self.files_completed,
            total_files: self.summary.total_files,
        });
    }

    fn destination(&mut self, name: &str) -> Option<PathBuf> {
        let dest = sanitize_extract_path(&self.request.dest_dir, Path::new(name));
        if dest.is_none() {
            self.summary.fail(name, "blocked unsafe path");
        }
        dest
    }

    /// 부모 디렉토리를 만들지 못하면 실패로 기록하고 false
    fn prepare_parent(&mut self, name: &str, dest: &Path) -> bool {
        let Some(parent) = dest.parent() else {
            return true;
        };
        match fs::create_dir_all(parent) {
            Ok(()) => true,
            Err(e) => {
                self.summary
                    .fail(name, format!("cannot create parent directory: {}", e));
                false
            }
        }
    }

    fn archive_path(&self) -> String {
        self.request.archive_path.display().to_string()
    }
}

fn is_macos_metadata(path: &str) -> bool {
    path.starts_with(MACOS_METADATA_PREFIX)
}

fn archive_display_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(v) => Some(v.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// 구분자를 '/'로 맞추고 끝 '/'를 뗀 이름. 루트 자신("", "/", "./")은 None
fn clean_entry_name(raw_path: &str) -> Option<String> {
    let unified = raw_path.replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed == "." {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn entry_from_raw(
    raw_path: &str,
    is_dir: bool,
    size: u64,
    modified: Option<NaiveDateTime>,
) -> Option<ArchiveEntry> {
    let name = clean_entry_name(raw_path)?;
    Some(if is_dir {
        ArchiveEntry::directory(format!("{}/", name), modified)
    } else {
        ArchiveEntry::file(name, size, modified)
    })
}

fn map_zip_error(path: &Path, error: ZipError, password: Option<&str>, stage: Stage) -> ArcpeekError {
    let path = path.display().to_string();
    match error {
        ZipError::UnsupportedArchive(detail)
            if detail == ZipError::PASSWORD_REQUIRED && password.is_none() =>
        {
            ArcpeekError::ArchivePasswordRequired { path }
        }
        ZipError::InvalidPassword => ArcpeekError::ArchiveInvalidPassword {
            path,
            reason: "Invalid ZIP password".to_string(),
        },
        ZipError::UnsupportedArchive(detail)
            if password.is_some() && detail.to_ascii_lowercase().contains("password") =>
        {
            ArcpeekError::ArchiveInvalidPassword {
                path,
                reason: detail.to_string(),
            }
        }
        other => stage_failure(path, other.to_string(), stage),
    }
}

fn map_7z_error(path: &Path, error: SevenZError, password: Option<&str>, stage: Stage) -> ArcpeekError {
    let path = path.display().to_string();
    match error {
        SevenZError::PasswordRequired if password.is_none() => {
            ArcpeekError::ArchivePasswordRequired { path }
        }
        SevenZError::PasswordRequired => ArcpeekError::ArchiveInvalidPassword {
            path,
            reason: "Password required".to_string(),
        },
        SevenZError::MaybeBadPassword(inner) => ArcpeekError::ArchiveInvalidPassword {
            path,
            reason: inner.to_string(),
        },
        other => {
            let reason = other.to_string();
            if password.is_some() && reason.to_ascii_lowercase().contains("password") {
                ArcpeekError::ArchiveInvalidPassword { path, reason }
            } else {
                stage_failure(path, reason, stage)
            }
        }
    }
}

fn map_rar_error(
    path: &Path,
    error: UnrarError,
    password: Option<&str>,
    stage: Stage,
) -> ArcpeekError {
    let path = path.display().to_string();
    match error.code {
        RarCode::MissingPassword => ArcpeekError::ArchivePasswordRequired { path },
        RarCode::BadPassword => ArcpeekError::ArchiveInvalidPassword {
            path,
            reason: "Invalid RAR password".to_string(),
        },
        // 잘못된 비밀번호로 복호화한 데이터는 CRC 오류로 드러난다
        RarCode::BadData if password.is_some() => ArcpeekError::ArchiveInvalidPassword {
            path,
            reason: error.to_string(),
        },
        _ => stage_failure(path, error.to_string(), stage),
    }
}

fn stage_failure(path: String, reason: String, stage: Stage) -> ArcpeekError {
    match stage {
        Stage::List => ArcpeekError::ArchiveListFailed { path, reason },
        Stage::Extract => ArcpeekError::ArchiveExtractFailed { path, reason },
    }
}

fn zip_modified(datetime: Option<zip::DateTime>) -> Option<NaiveDateTime> {
    let dt = datetime?;
    NaiveDate::from_ymd_opt(dt.year().into(), dt.month().into(), dt.day().into())?.and_hms_opt(
        dt.hour().into(),
        dt.minute().into(),
        dt.second().into(),
    )
}

fn unix_modified(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(&Local).naive_local())
}

fn tar_modified(mtime: io::Result<u64>) -> Option<NaiveDateTime> {
    unix_modified(i64::try_from(mtime.ok()?).ok()?)
}

fn sevenz_modified(entry: &sevenz_rust2::SevenZArchiveEntry) -> Option<NaiveDateTime> {
    if !entry.has_last_modified_date {
        return None;
    }
    unix_modified(entry.last_modified_date.to_unix_time_secs())
}

/// RAR 헤더의 DOS 시각 (상위 16비트 날짜, 하위 16비트 시각, 초는 2초 단위)
fn dos_modified(stamp: u32) -> Option<NaiveDateTime> {
    if stamp == 0 {
        return None;
    }
    let (date, time) = (stamp >> 16, stamp & 0xFFFF);
    NaiveDate::from_ymd_opt(
        ((date >> 9) & 0x7F) as i32 + 1980,
        (date >> 5) & 0x0F,
        date & 0x1F,
    )?
    .and_hms_opt((time >> 11) & 0x1F, (time >> 5) & 0x3F, (time & 0x1F) * 2)
}

fn list_zip_entries(path: &Path, password: Option<&str>) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| map_zip_error(path, e, password, Stage::List))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = match password {
            Some(pass) => archive.by_index_decrypt(i, pass.as_bytes()),
            None => archive.by_index(i),
        }
        .map_err(|e| map_zip_error(path, e, password, Stage::List))?;

        let is_dir = entry.is_dir();
        entries.extend(entry_from_raw(
            entry.name(),
            is_dir,
            if is_dir { 0 } else { entry.size() },
            zip_modified(entry.last_modified()),
        ));
    }
    Ok(entries)
}

fn open_tar(path: &Path, format: ArchiveFormat) -> Result<TarArchive<Box<dyn Read>>> {
    let reader = BufReader::new(File::open(path)?);
    let decoded: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(GzDecoder::new(reader)),
        ArchiveFormat::TarBz2 => Box::new(BzDecoder::new(reader)),
        ArchiveFormat::TarXz => Box::new(XzDecoder::new(reader)),
        ArchiveFormat::TarZst => Box::new(ZstdDecoder::new(reader)?),
        ArchiveFormat::Tar => Box::new(reader),
        ArchiveFormat::Zip | ArchiveFormat::SevenZ | ArchiveFormat::Rar => {
            return Err(ArcpeekError::ArchiveUnsupportedFormat {
                path: path.display().to_string(),
            })
        }
    };
    Ok(TarArchive::new(decoded))
}

fn list_tar_like_entries<R: Read>(
    mut archive: TarArchive<R>,
    src: &Path,
) -> Result<Vec<ArchiveEntry>> {
    let list_failed = |e: io::Error| ArcpeekError::ArchiveListFailed {
        path: src.display().to_string(),
        reason: e.to_string(),
    };

    let mut entries = Vec::new();
    for entry_result in archive.entries().map_err(list_failed)? {
        let entry = entry_result.map_err(list_failed)?;
        let path = entry.path().map_err(list_failed)?;
        let name = archive_display_path(&path);
        let header = entry.header();
        let is_dir = header.entry_type().is_dir();
        entries.extend(entry_from_raw(
            &name,
            is_dir,
            if is_dir { 0 } else { entry.size() },
            tar_modified(header.mtime()),
        ));
    }
    Ok(entries)
}

fn list_7z_entries(path: &Path, password: Option<&str>) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path)?;
    let reader = sevenz_rust2::SevenZReader::new(
        file,
        password
            .map(SevenZPassword::from)
            .unwrap_or_else(SevenZPassword::empty),
    )
    .map_err(|e| map_7z_error(path, e, password, Stage::List))?;

    Ok(reader
        .archive()
        .files
        .iter()
        .filter_map(|e| entry_from_raw(&e.name, e.is_directory, e.size, sevenz_modified(e)))
        .collect())
}

fn open_rar<'a>(path: &'a Path, password: Option<&'a str>) -> unrar::Archive<'a> {
    match password {
        Some(pass) => unrar::Archive::with_password(path, pass),
        None => unrar::Archive::new(path),
    }
}

fn list_rar_entries(path: &Path, password: Option<&str>) -> Result<Vec<ArchiveEntry>> {
    let rar_error = |e: UnrarError| map_rar_error(path, e, password, Stage::List);
    let listing = open_rar(path, password).open_for_listing().map_err(rar_error)?;

    let mut entries = Vec::new();
    for header in listing {
        let header = header.map_err(rar_error)?;
        let is_dir = header.is_directory();
        entries.extend(entry_from_raw(
            &header.filename.to_string_lossy(),
            is_dir,
            if is_dir { 0 } else { header.unpacked_size },
            dos_modified(header.file_time),
        ));
    }
    Ok(entries)
}

fn extract_zip_archive(ctx: &mut ExtractContext<'_>) -> Result<()> {
    let request = ctx.request;
    let archive_path = &request.archive_path;
    let password = request.password.as_deref();
    let file = File::open(archive_path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| map_zip_error(archive_path, e, password, Stage::Extract))?;

    for idx in 0..archive.len() {
        if ctx.cancelled() {
            return Ok(());
        }

        let mut entry = match password {
            Some(pass) => archive.by_index_decrypt(idx, pass.as_bytes()),
            None => archive.by_index(idx),
        }
        .map_err(|e| map_zip_error(archive_path, e, password, Stage::Extract))?;

        let name = entry.name().to_string();
        if clean_entry_name(&name).is_none() || is_macos_metadata(&name) {
            continue;
        }
        let Some(dest_path) = ctx.destination(&name) else {
            continue;
        };

        if entry.is_dir() {
            if let Err(e) = fs::create_dir_all(&dest_path) {
                ctx.summary.fail(&name, e);
                continue;
            }
        } else {
            if dest_path.is_dir() {
                ctx.summary.fail(&name, "destination is a directory");
                continue;
            }
            if !ctx.prepare_parent(&name, &dest_path) {
                continue;
            }
            let written = File::create(&dest_path).and_then(|mut out| io::copy(&mut entry, &mut out));
            if let Err(e) = written {
                ctx.summary.fail(&name, e);
                continue;
            }
        }

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode));
        }

        ctx.completed(name);
    }
    Ok(())
}

fn extract_tar_like_archive<R: Read>(
    mut archive: TarArchive<R>,
    ctx: &mut ExtractContext<'_>,
) -> Result<()> {
    let entries = archive
        .entries()
        .map_err(|e| ArcpeekError::ArchiveExtractFailed {
            path: ctx.archive_path(),
            reason: e.to_string(),
        })?;

    for entry_result in entries {
        if ctx.cancelled() {
            return Ok(());
        }

        let mut entry = match entry_result {
            Ok(v) => v,
            Err(e) => {
                ctx.summary.fail("<entry>", e);
                continue;
            }
        };
        let path_buf = match entry.path() {
            Ok(v) => v.into_owned(),
            Err(e) => {
                ctx.summary.fail("<entry>", e);
                continue;
            }
        };
        let name = archive_display_path(&path_buf);
        if name.is_empty() || is_macos_metadata(&name) {
            continue;
        }
        let Some(dest_path) = ctx.destination(&name) else {
            continue;
        };

        if !ctx.prepare_parent(&name, &dest_path) {
            continue;
        }
        match entry.unpack(&dest_path) {
            Ok(_) => ctx.completed(name),
            Err(e) => ctx.summary.fail(&name, e),
        }
    }
    Ok(())
}

fn extract_7z_archive(ctx: &mut ExtractContext<'_>) -> Result<()> {
    if ctx.cancelled() {
        return Ok(());
    }

    let archive_path = ctx.request.archive_path.clone();
    let dest_root = ctx.request.dest_dir.clone();
    let password = ctx.request.password.clone();
    let file = File::open(&archive_path)?;

    let mut extract_fn = |entry: &sevenz_rust2::SevenZArchiveEntry,
                          reader: &mut dyn Read,
                          _output_path: &PathBuf|
     -> std::result::Result<bool, sevenz_rust2::Error> {
        if ctx.cancelled() {
            return Ok(false);
        }

        let entry_name = entry.name.clone();
        if clean_entry_name(&entry_name).is_none() || is_macos_metadata(&entry_name) {
            return Ok(true);
        }
        let Some(safe_dest) = ctx.destination(&entry_name) else {
            return Ok(true);
        };

        if entry.is_directory {
            match fs::create_dir_all(&safe_dest) {
                Ok(()) => ctx.completed(format!("{}/", entry_name)),
                Err(e) => ctx.summary.fail(&entry_name, e),
            }
            return Ok(true);
        }

        if !ctx.prepare_parent(&entry_name, &safe_dest) {
            return Ok(true);
        }
        match File::create(&safe_dest).and_then(|mut writer| io::copy(reader, &mut writer)) {
            Ok(_) => ctx.completed(entry_name),
            Err(e) => ctx.summary.fail(&entry_name, e),
        }
        Ok(true)
    };

    let result = match password.as_deref() {
        Some(pass) => sevenz_rust2::decompress_with_extract_fn_and_password(
            file,
            &dest_root,
            SevenZPassword::from(pass),
            &mut extract_fn,
        ),
        None => sevenz_rust2::decompress_with_extract_fn(file, &dest_root, &mut extract_fn),
    };

    result.map_err(|error| map_7z_error(&archive_path, error, password.as_deref(), Stage::Extract))
}

fn extract_rar_archive(ctx: &mut ExtractContext<'_>) -> Result<()> {
    let archive_path = ctx.request.archive_path.clone();
    let password = ctx.request.password.clone();
    let rar_error =
        |e: UnrarError| map_rar_error(&archive_path, e, password.as_deref(), Stage::Extract);

    let mut cursor = open_rar(&archive_path, password.as_deref())
        .open_for_processing()
        .map_err(rar_error)?;

    loop {
        if ctx.cancelled() {
            return Ok(());
        }
        let Some(header) = cursor.read_header().map_err(rar_error)? else {
            return Ok(());
        };

        let raw_name = header.entry().filename.to_string_lossy().replace('\\', "/");
        let is_dir = header.entry().is_directory();
        let dest = match clean_entry_name(&raw_name) {
            Some(_) if is_macos_metadata(&raw_name) => None,
            Some(_) => ctx.destination(&raw_name),
            None => None,
        };
        let Some(dest) = dest else {
            cursor = header.skip().map_err(rar_error)?;
            continue;
        };

        if is_dir {
            match fs::create_dir_all(&dest) {
                Ok(()) => ctx.completed(raw_name),
                Err(e) => ctx.summary.fail(&raw_name, e),
            }
            cursor = header.skip().map_err(rar_error)?;
            continue;
        }
        if !ctx.prepare_parent(&raw_name, &dest) {
            cursor = header.skip().map_err(rar_error)?;
            continue;
        }
        // 엔트리 해제 실패 후에는 커서를 이어갈 수 없어 작업 전체를 실패로 돌린다
        cursor = header.extract_to(&dest).map_err(rar_error)?;
        ctx.completed(raw_name);
    }
}

fn sanitize_extract_path(dest_root: &Path, raw_path: &Path) -> Option<PathBuf> {
    let mut clean = PathBuf::new();
    for comp in raw_path.components() {
        match comp {
            Component::Normal(v) => clean.push(v),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    let out = dest_root.join(clean);
    if out.starts_with(dest_root) {
        Some(out)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;
    use bzip2::write::BzEncoder;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use std::sync::mpsc;
    use tar::{Builder as TarBuilder, Header as TarHeader};
    use tempfile::tempdir;
    use xz2::write::XzEncoder;
    use zip::write::SimpleFileOptions as ZipFileOptions;
    use zip::{AesMode, CompressionMethod, ZipWriter};

    fn cancel_flag() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    fn request(archive_path: &Path, dest: &Path, password: Option<&str>) -> ArchiveExtractRequest {
        ArchiveExtractRequest {
            archive_path: archive_path.to_path_buf(),
            dest_dir: dest.to_path_buf(),
            password: password.map(str::to_string),
        }
    }

    fn write_zip(path: &Path, files: &[(&str, &[u8])], options: ZipFileOptions) {
        let file = File::create(path).expect("create zip file");
        let mut writer = ZipWriter::new(file);
        for (name, data) in files {
            if name.ends_with('/') {
                writer
                    .add_directory(name.to_string(), options)
                    .expect("add zip directory");
            } else {
                writer.start_file(name.to_string(), options).expect("start zip entry");
                writer.write_all(data).expect("write zip entry");
            }
        }
        writer.finish().expect("finish zip");
    }

    fn stored() -> ZipFileOptions {
        ZipFileOptions::default().compression_method(CompressionMethod::Stored)
    }

    fn append_tar_files<W: Write>(builder: &mut TarBuilder<W>, files: &[(&str, &[u8], u64)]) {
        for (name, data, mtime) in files {
            let mut header = TarHeader::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_mtime(*mtime);
            builder
                .append_data(&mut header, name, *data)
                .expect("append tar entry");
        }
    }

    #[test]
    fn test_detect_archive_format() {
        let cases = [
            ("a.zip", Some(ArchiveFormat::Zip)),
            ("a.tar", Some(ArchiveFormat::Tar)),
            ("a.tar.gz", Some(ArchiveFormat::TarGz)),
            ("a.tgz", Some(ArchiveFormat::TarGz)),
            ("a.tar.bz2", Some(ArchiveFormat::TarBz2)),
            ("a.tbz", Some(ArchiveFormat::TarBz2)),
            ("a.tbz2", Some(ArchiveFormat::TarBz2)),
            ("a.tar.xz", Some(ArchiveFormat::TarXz)),
            ("a.tar.zst", Some(ArchiveFormat::TarZst)),
            ("A.7Z", Some(ArchiveFormat::SevenZ)),
            ("test.tar.gz.zip", Some(ArchiveFormat::Zip)),
            ("Photos.RAR", Some(ArchiveFormat::Rar)),
            ("notes.txt.gz", None),
            ("dump.bz2", None),
            ("image.xz", None),
            (".hidden", None),
        ];
        for (name, expected) in cases {
            assert_eq!(detect_archive_format(Path::new(name)), expected, "{name}");
        }
    }

    #[test]
    fn test_clean_entry_name_drops_root_entries() {
        assert_eq!(clean_entry_name(""), None);
        assert_eq!(clean_entry_name("/"), None);
        assert_eq!(clean_entry_name("./"), None);
        assert_eq!(clean_entry_name("docs\\a.txt").as_deref(), Some("docs/a.txt"));
        assert_eq!(clean_entry_name("docs/").as_deref(), Some("docs"));
        assert!(entry_from_raw("", true, 0, None).is_none());
    }

    #[test]
    fn test_sanitize_extract_path_blocks_unsafe_paths() {
        let root = PathBuf::from("/tmp/base");
        assert!(sanitize_extract_path(&root, Path::new("ok/file.txt")).is_some());
        assert!(sanitize_extract_path(&root, Path::new("../evil")).is_none());
        assert!(sanitize_extract_path(&root, Path::new("/abs/path")).is_none());
    }

    #[test]
    fn test_unsupported_and_missing_files_are_operation_failures() {
        let temp = tempdir().expect("create tempdir");
        let gz = temp.path().join("notes.txt.gz");
        fs::write(&gz, b"\x1f\x8b").expect("write gz stub");
        let err = list_entries(&gz, None).expect_err("bare gzip is not an archive");
        assert!(matches!(err, ArcpeekError::ArchiveUnsupportedFormat { .. }));
        assert_eq!(err.kind(), ErrorKind::OperationFailed);

        let rar = temp.path().join("broken.rar");
        fs::write(&rar, b"Rar!").expect("write rar stub");
        let err = list_entries(&rar, None).expect_err("truncated rar");
        assert_eq!(err.kind(), ErrorKind::OperationFailed);

        let missing = list_entries(&temp.path().join("missing.zip"), None)
            .expect_err("missing archive");
        assert_eq!(missing.kind(), ErrorKind::OperationFailed);
    }

    #[test]
    fn test_zip_listing_has_names_parents_and_timestamps() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("sample.zip");
        let stamp = zip::DateTime::from_date_and_time(2024, 1, 2, 3, 4, 6).expect("valid zip time");
        write_zip(
            &archive_path,
            &[("docs/", b""), ("docs/readme.md", b"hello")],
            stored().last_modified_time(stamp),
        );

        let entries = list_entries(&archive_path, None).expect("list zip");
        assert_eq!(entries.len(), 2);
        let dir = &entries[0];
        assert!(dir.is_dir);
        assert_eq!(dir.path, "docs/");
        assert_eq!(dir.name, "");
        assert_eq!(dir.parent_path, None);

        let file = &entries[1];
        assert_eq!(file.name, "readme.md");
        assert_eq!(file.parent_path.as_deref(), Some("docs/"));
        assert_eq!(file.size, 5);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).and_then(|d| d.and_hms_opt(3, 4, 6));
        assert_eq!(file.modified, expected);
    }

    #[test]
    fn test_macos_metadata_is_skipped() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("mac.zip");
        write_zip(
            &archive_path,
            &[
                ("real.txt", b"data"),
                ("__MACOSX/", b""),
                ("__MACOSX/._real.txt", b"junk"),
            ],
            stored(),
        );

        let entries = list_entries(&archive_path, None).expect("list zip");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "real.txt");

        let dest = temp.path().join("out");
        let summary = extract_archive(
            &request(&archive_path, &dest, None),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect("extract zip");
        assert_eq!(summary.items_failed, 0);
        assert!(dest.join("real.txt").exists());
        assert!(!dest.join("__MACOSX").exists());
    }

    #[test]
    fn test_listing_synthesizes_missing_directories() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("implicit.zip");
        write_zip(&archive_path, &[("a/b/c.txt", b"x"), ("a/d.txt", b"y")], stored());

        let tree = read_listing(&archive_path, None).expect("read listing");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].item.path, "a/");
        assert!(tree[0].item.is_dir);
        let kids = tree[0].children.as_ref().expect("synthesized dir has children");
        let paths: Vec<&str> = kids.iter().map(|k| k.item.path.as_str()).collect();
        assert_eq!(paths, vec!["a/b/", "a/d.txt"]);
    }

    #[test]
    fn test_fill_missing_directories_dedupes() {
        let entries = vec![
            ArchiveEntry::file("x/y/z.txt", 1, None),
            ArchiveEntry::directory("x/", None),
            ArchiveEntry::file("x/y/z.txt", 2, None),
        ];
        let filled = fill_missing_directories(entries);
        let paths: Vec<&str> = filled.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["x/y/", "x/y/z.txt", "x/"]);
        assert_eq!(filled[1].size, 1);
    }

    #[test]
    fn test_zip_password_list_and_extract_errors() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("secret.zip");
        write_zip(
            &archive_path,
            &[("secret.txt", b"top-secret")],
            ZipFileOptions::default().with_aes_encryption(AesMode::Aes256, "correct-password"),
        );

        let no_password = list_entries(&archive_path, None);
        assert!(matches!(
            no_password,
            Err(ArcpeekError::ArchivePasswordRequired { .. })
        ));

        let wrong_password = list_entries(&archive_path, Some("wrong-password"));
        assert!(matches!(
            wrong_password,
            Err(ArcpeekError::ArchiveInvalidPassword { .. })
        ));
        assert!(list_entries(&archive_path, Some("correct-password")).is_ok());

        let wrong_extract = extract_archive(
            &request(&archive_path, &temp.path().join("wrong"), Some("wrong-password")),
            mpsc::channel().0,
            cancel_flag(),
        );
        let err = wrong_extract.expect_err("wrong password must fail");
        assert_eq!(err.kind(), ErrorKind::PasswordRequired);

        let ok_dest = temp.path().join("ok");
        extract_archive(
            &request(&archive_path, &ok_dest, Some("correct-password")),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect("extract with password");
        assert_eq!(
            fs::read(ok_dest.join("secret.txt")).expect("read extracted"),
            b"top-secret"
        );
    }

    #[test]
    fn test_extract_zip_blocks_zip_slip_and_overwrites() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("unsafe.zip");
        write_zip(
            &archive_path,
            &[("../evil.txt", b"evil"), ("safe.txt", b"safe")],
            stored(),
        );

        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).expect("create dest");
        fs::write(dest.join("safe.txt"), b"old").expect("create existing file");

        let summary = extract_archive(
            &request(&archive_path, &dest, None),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect("extract zip");

        assert_eq!(summary.items_failed, 1);
        assert!(summary
            .errors
            .iter()
            .any(|e| e.contains("blocked unsafe path")));
        assert!(!temp.path().join("evil.txt").exists());
        assert_eq!(
            fs::read(dest.join("safe.txt")).expect("read overwritten file"),
            b"safe"
        );
    }

    #[test]
    fn test_extract_reports_progress_per_entry() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("progress.zip");
        write_zip(&archive_path, &[("a.txt", b"1"), ("b.txt", b"2")], stored());

        let (tx, rx) = mpsc::channel();
        extract_archive(
            &request(&archive_path, &temp.path().join("out"), None),
            tx,
            cancel_flag(),
        )
        .expect("extract zip");

        let events: Vec<ArchiveProgressEvent> = rx.try_iter().collect();
        let names: Vec<&str> = events.iter().map(|e| e.entry.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(events[1].files_completed, 2);
        assert_eq!(events[1].total_files, 2);
    }

    #[test]
    fn test_cancelled_extraction_stops_early() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("cancel.zip");
        write_zip(&archive_path, &[("a.txt", b"1")], stored());

        let flag = cancel_flag();
        flag.store(true, Ordering::Relaxed);
        let dest = temp.path().join("out");
        let summary = extract_archive(&request(&archive_path, &dest, None), mpsc::channel().0, flag)
            .expect("extract zip");
        assert!(summary.cancelled);
        assert!(!dest.join("a.txt").exists());
    }

    #[test]
    fn test_parent_directory_failure_is_recorded() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("nested.zip");
        write_zip(
            &archive_path,
            &[("nested/inner.txt", b"1"), ("top.txt", b"2")],
            stored(),
        );
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).expect("create dest");
        fs::write(dest.join("nested"), b"not a dir").expect("write blocker");

        let summary = extract_archive(
            &request(&archive_path, &dest, None),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect("extract zip");
        assert_eq!(summary.items_failed, 1);
        assert!(summary.errors[0].starts_with("nested/inner.txt: cannot create parent directory"));
        assert!(dest.join("top.txt").exists());
    }

    #[test]
    fn test_rar_error_codes_map_to_password_kinds() {
        let path = Path::new("locked.rar");
        let err = |code| UnrarError {
            code,
            when: unrar::error::When::Open,
        };

        let missing = map_rar_error(path, err(RarCode::MissingPassword), None, Stage::List);
        assert!(matches!(missing, ArcpeekError::ArchivePasswordRequired { .. }));

        let wrong = map_rar_error(path, err(RarCode::BadPassword), Some("nope"), Stage::List);
        assert!(matches!(wrong, ArcpeekError::ArchiveInvalidPassword { .. }));

        let corrupt_with_password =
            map_rar_error(path, err(RarCode::BadData), Some("nope"), Stage::Extract);
        assert_eq!(corrupt_with_password.kind(), ErrorKind::PasswordRequired);

        let corrupt = map_rar_error(path, err(RarCode::BadData), None, Stage::Extract);
        assert!(matches!(corrupt, ArcpeekError::ArchiveExtractFailed { .. }));
    }

    #[test]
    fn test_dos_timestamp_decoding() {
        let date = ((2024 - 1980) << 9) | (1 << 5) | 2;
        let time = (3 << 11) | (4 << 5) | (6 / 2);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).and_then(|d| d.and_hms_opt(3, 4, 6));
        assert_eq!(dos_modified((date << 16) | time), expected);
        assert_eq!(dos_modified(0), None);
    }

    #[test]
    fn test_destination_file_is_rejected() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("a.zip");
        write_zip(&archive_path, &[("a.txt", b"1")], stored());
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"file").expect("write blocker");

        let err = extract_archive(
            &request(&archive_path, &blocker, None),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect_err("destination must be a directory");
        assert_eq!(err.kind(), ErrorKind::OperationFailed);
    }

    #[test]
    fn test_tar_gz_listing_and_extract() {
        let temp = tempdir().expect("create tempdir");
        let archive_path = temp.path().join("sample.tar.gz");
        let encoder = GzEncoder::new(
            File::create(&archive_path).expect("create tar.gz"),
            flate2::Compression::default(),
        );
        let mut builder = TarBuilder::new(encoder);
        append_tar_files(
            &mut builder,
            &[("nested/beta.txt", b"beta", 1_700_000_000), ("alpha.txt", b"alpha", 0)],
        );
        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish gzip");

        let entries = list_entries(&archive_path, None).expect("list tar.gz");
        let beta = entries
            .iter()
            .find(|e| e.path == "nested/beta.txt")
            .expect("beta listed");
        assert_eq!(beta.parent_path.as_deref(), Some("nested/"));
        assert!(beta.modified.is_some());

        let dest = temp.path().join("dest");
        let summary = extract_archive(
            &request(&archive_path, &dest, None),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect("extract tar.gz");
        assert_eq!(summary.items_failed, 0);
        assert_eq!(
            fs::read(dest.join("nested").join("beta.txt")).expect("read beta"),
            b"beta"
        );
    }

    #[test]
    fn test_tar_bz2_and_xz_listing() {
        let temp = tempdir().expect("create tempdir");

        let bz_path = temp.path().join("sample.tar.bz2");
        let bz = BzEncoder::new(
            File::create(&bz_path).expect("create tar.bz2"),
            bzip2::Compression::default(),
        );
        let mut builder = TarBuilder::new(bz);
        append_tar_files(&mut builder, &[("one.txt", b"1", 0)]);
        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish bzip2");

        let xz_path = temp.path().join("sample.tar.xz");
        let xz = XzEncoder::new(File::create(&xz_path).expect("create tar.xz"), 6);
        let mut builder = TarBuilder::new(xz);
        append_tar_files(&mut builder, &[("two.txt", b"2", 0)]);
        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish xz");

        let bz_entries = list_entries(&bz_path, None).expect("list tar.bz2");
        assert_eq!(bz_entries[0].path, "one.txt");
        let xz_entries = list_entries(&xz_path, None).expect("list tar.xz");
        assert_eq!(xz_entries[0].path, "two.txt");
    }

    #[test]
    fn test_7z_listing_and_extract_roundtrip() {
        let temp = tempdir().expect("create tempdir");
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("inner")).expect("create source tree");
        fs::write(src.join("inner").join("plain.txt"), b"plain-7z").expect("write source file");
        let archive_path = temp.path().join("sample.7z");
        sevenz_rust2::compress_to_path(&src, &archive_path).expect("create 7z");

        let entries = list_entries(&archive_path, None).expect("list 7z entries");
        assert!(entries.iter().all(|e| e.path != "/" && !e.path.is_empty()));
        let plain = entries
            .iter()
            .find(|e| e.path == "inner/plain.txt")
            .expect("file listed");
        assert!(plain.modified.is_some());

        let tree = read_listing(&archive_path, None).expect("list 7z");
        let all: usize = tree.iter().map(TreeNode::count).sum();
        assert_eq!(all, 2);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].item.path, "inner/");

        let dest = temp.path().join("dest");
        let summary = extract_archive(
            &request(&archive_path, &dest, None),
            mpsc::channel().0,
            cancel_flag(),
        )
        .expect("extract 7z");
        assert_eq!(summary.items_failed, 0);
        assert_eq!(summary.items_processed, summary.total_files);
        assert!(dest.join("inner").join("plain.txt").exists());
    }
}
