use hex::encode;
use md5::{Digest, Md5};
use uuid::Uuid;

/// 生成全局唯一 ID（uuid 去掉连字符）
pub fn build_id() -> String {
    let uuid = Uuid::new_v4().simple();
    format!("{}", uuid)
}

pub fn build_md5(content: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(content);
    let result = hasher.finalize();
    encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_id_unique() {
        let a = build_id();
        let b = build_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_build_md5() {
        assert_eq!(build_md5("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }
}
