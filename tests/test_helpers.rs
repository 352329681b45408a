// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的临时文件、临时配置库、样例数据
// ==========================================
#![allow(dead_code)]

use rab_estimator::config::ConfigManager;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

// ==========================================
// 样例文件内容
// ==========================================

/// 资源目录（标题行 + 表头 + 分段 + 混合价格格式 + 负价行）
pub const CATALOG_CSV: &str = "\
DAFTAR HARGA SATUAN UPAH DAN BAHAN
KODE,URAIAN,SATUAN,HARGA
A,UPAH
L.01,Pekerja,OH,\"Rp 100.000\"
L.02,Tukang batu,OH,120000
B,BAHAN
M.01,Batu Kali,m3,286500
M.02,Semen Portland,kg,\"1.300,00\"
M.03,Pasir pasang,m3,harga menyusul
M.04,Kerikil,m3,286.500
M.05,Potongan retur,ls,-1.500
";

/// AHSP 分析（两条分析，含标题、合计行、未入目录的组成）
pub const RECIPES_CSV: &str = "\
,Analisa Harga Satuan Pekerjaan
1,A.2.2.1,Pasangan Batu Kali 1:4,m3
A,TENAGA KERJA
,Pekerja,OH,1.5
,Tukang batu,OH,0.75
B,BAHAN
,Batu Kali,m3,\"1,2\"
,Semen Portland,kg,163
,Kawat ikat,kg,0.5
,JUMLAH,,
2,A.4.4.1,Plesteran 1:4 tebal 15 mm,m2
A,TENAGA KERJA
,Pekerja,OH,0.3
B,BAHAN
,Semen,kg,6.24
";

/// 工程量模板（第三行缺工程量）
pub const VOLUMES_CSV: &str = "\
URAIAN_PEKERJAAN,VOLUME,LOKASI,SATUAN,MINGGU_MULAI,DURASI_MINGGU
Pasangan batu kali 1:4,10,Pondasi,m3,1,2
Plesteran 1:4 tebal 15 mm,\"25,5\",Dinding,m2,3,2
Galian tanah,,Pondasi,m3,1,1
";

// ==========================================
// 临时文件
// ==========================================

/// 在临时目录中写入一个文件
///
/// # 返回
/// - PathBuf: 文件路径（TempDir 需要保持存活）
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// 写入三份样例文件
pub struct SampleFiles {
    pub dir: TempDir,
    pub catalog: PathBuf,
    pub recipes: PathBuf,
    pub volumes: PathBuf,
}

pub fn sample_files() -> SampleFiles {
    let dir = TempDir::new().unwrap();
    let catalog = write_file(&dir, "harga_satuan.csv", CATALOG_CSV);
    let recipes = write_file(&dir, "ahsp_pasangan.csv", RECIPES_CSV);
    let volumes = write_file(&dir, "volume.csv", VOLUMES_CSV);
    SampleFiles {
        dir,
        catalog,
        recipes,
        volumes,
    }
}

// ==========================================
// 临时配置库
// ==========================================

/// 创建临时配置库（config_kv 由 ConfigManager 建表）
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - ConfigManager
pub fn create_test_config() -> Result<(NamedTempFile, ConfigManager), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let manager = ConfigManager::new(&db_path)?;
    Ok((temp_file, manager))
}

/// 浮点近似相等
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}
