// ============================================================================
// 合成段生成：模仿 APK 内部二进制结构的占位数据
// ============================================================================
//
// 这些段只在结构上像真实产物（固定魔数、长度字段、签名标记字节），
// 不包含可执行字节码或真实资源表，不能被真实平台工具链使用。

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use crate::config::{ARSC_HEADER_SIZE, DEX_HEADER_SIZE};
use crate::utils::error::{AppError, AppResult};

/// dex 魔数 + 版本号
pub const DEX_MAGIC: &[u8; 8] = b"dex\n035\0";
/// dex 校验和所在偏移
pub const DEX_CHECKSUM_OFFSET: usize = 8;
const DEX_FILE_SIZE_OFFSET: usize = 0x20;
const DEX_HEADER_SIZE_OFFSET: usize = 0x24;
const DEX_ENDIAN_TAG_OFFSET: usize = 0x28;
const DEX_ENDIAN_TAG: u32 = 0x1234_5678;

/// 资源表块类型
pub const RES_TABLE_TYPE: u16 = 0x0002;

/// 签名块起始标记（ASN.1 SEQUENCE + 长格式长度）
pub const SIGNATURE_TAG: [u8; 2] = [0x30, 0x82];

/// 图标颜色（RGB）
const ICON_COLOR: [u8; 3] = [0x3D, 0xDC, 0x84];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// 生成 classes.dex 占位段
///
/// 布局：魔数(0..8) | 校验和(8..12) | 零填充 ... | 文件大小(0x20) | 头长度(0x24) | 字节序标记(0x28)
/// 校验和为 `[12..]` 区间的 CRC32，其余字节全部为零。
pub fn dex_segment(size: usize) -> Vec<u8> {
    let size = size.max(DEX_HEADER_SIZE);
    let mut buf = vec![0u8; size];
    buf[..8].copy_from_slice(DEX_MAGIC);
    put_u32_le(&mut buf, DEX_FILE_SIZE_OFFSET, size as u32);
    put_u32_le(&mut buf, DEX_HEADER_SIZE_OFFSET, DEX_HEADER_SIZE as u32);
    put_u32_le(&mut buf, DEX_ENDIAN_TAG_OFFSET, DEX_ENDIAN_TAG);
    let checksum = crc32fast::hash(&buf[DEX_CHECKSUM_OFFSET + 4..]);
    put_u32_le(&mut buf, DEX_CHECKSUM_OFFSET, checksum);
    buf
}

/// 生成 resources.arsc 占位段：类型(u16) + 头长度(u16) + 总长度(u32)，其余为零
pub fn arsc_segment(size: usize) -> Vec<u8> {
    let size = size.max(ARSC_HEADER_SIZE);
    let mut buf = vec![0u8; size];
    buf[0..2].copy_from_slice(&RES_TABLE_TYPE.to_le_bytes());
    buf[2..4].copy_from_slice(&(ARSC_HEADER_SIZE as u16).to_le_bytes());
    put_u32_le(&mut buf, 4, size as u32);
    buf
}

/// 生成签名块占位：以 ASN.1 标记开头，紧跟大端剩余长度
pub fn signature_blob(size: usize) -> Vec<u8> {
    let size = size.max(4);
    let mut buf = vec![0u8; size];
    buf[..2].copy_from_slice(&SIGNATURE_TAG);
    let remaining = (size - 4).min(u16::MAX as usize) as u16;
    buf[2..4].copy_from_slice(&remaining.to_be_bytes());
    buf
}

fn put_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

// ============================================================================
// 图标
// ============================================================================

/// 生成单色 PNG 图标（RGB，8 位色深）
pub fn solid_png(size: u32) -> AppResult<Vec<u8>> {
    let side = size.max(1);
    let row_len = 1 + side as usize * 3;
    let mut raw = Vec::with_capacity(row_len * side as usize);
    for _ in 0..side {
        // 每行前缀过滤类型 0（None）
        raw.push(0);
        for _ in 0..side {
            raw.extend_from_slice(&ICON_COLOR);
        }
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|e| AppError::PackageError(format!("图标压缩失败: {}", e)))?;
    let idat = encoder
        .finish()
        .map_err(|e| AppError::PackageError(format!("图标压缩失败: {}", e)))?;

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&side.to_be_bytes());
    ihdr.extend_from_slice(&side.to_be_bytes());
    // 位深 8，颜色类型 2（RGB），压缩/过滤/隔行均为 0
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);

    let mut png = Vec::with_capacity(PNG_SIGNATURE.len() + idat.len() + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_png_chunk(&mut png, b"IHDR", &ihdr);
    write_png_chunk(&mut png, b"IDAT", &idat);
    write_png_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn write_png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

// ============================================================================
// 签名元数据
// ============================================================================

/// SHA-256 摘要（十六进制）
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// 生成 META-INF/MANIFEST.MF：逐条列出打包条目及摘要
pub fn signing_manifest<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> String {
    let mut out = String::from("Manifest-Version: 1.0\r\nCreated-By: prism-apk-forge\r\n\r\n");
    for (name, data) in entries {
        out.push_str(&format!(
            "Name: {}\r\nSHA-256-Digest: {}\r\n\r\n",
            name,
            sha256_hex(data)
        ));
    }
    out
}

/// 生成 META-INF/CERT.SF：引用 MANIFEST.MF 的摘要
pub fn signature_file(manifest_mf: &str) -> String {
    format!(
        "Signature-Version: 1.0\r\nCreated-By: prism-apk-forge\r\nSHA-256-Digest-Manifest: {}\r\n\r\n",
        sha256_hex(manifest_mf.as_bytes())
    )
}

// ============================================================================
// 单元测试
// ============================================================================
