//! Embedded category dictionaries.
//!
//! Small built-in word lists shipped as string constants, one word per
//! line, in the same format [`crate::Manager::load_embedded`] accepts
//! for external files. These are data, not behavior; applications with
//! real corpora load their own files over or instead of these.

/// Subversive and separatist phrases.
pub const REACTIONARY: &str = "\
颠覆国家政权
分裂国家
台湾国
";

/// Spam and solicitation phrases.
pub const ADVERTISEMENT: &str = "\
加微信
代开发票
刷单兼职
日结工资
";

/// Politically sensitive phrases.
pub const POLITICAL: &str = "\
政治谣言
煽动颠覆
非法集会
";

/// Violent-act phrases.
pub const VIOLENCE: &str = "\
暴力袭击
故意杀人
绑架勒索
";

/// Scams and social-harm phrases.
pub const PEOPLE_LIFE: &str = "\
网络赌博
高利贷
传销组织
电信诈骗
";

/// Weapons and explosives phrases.
pub const GUN_EXPLOSION: &str = "\
枪支弹药
自制炸药
雷管出售
";

/// Obscenity phrases.
pub const PORNOGRAPHY: &str = "\
色情服务
淫秽视频
";

/// Graft and financial-crime phrases.
pub const CORRUPTION: &str = "\
贪污受贿
挪用公款
洗钱通道
";

/// Every embedded category as `(name, content)` pairs, for loading the
/// full built-in set in one call.
pub const ALL: &[(&str, &str)] = &[
    ("reactionary", REACTIONARY),
    ("advertisement", ADVERTISEMENT),
    ("political", POLITICAL),
    ("violence", VIOLENCE),
    ("people_life", PEOPLE_LIFE),
    ("gun_explosion", GUN_EXPLOSION),
    ("pornography", PORNOGRAPHY),
    ("corruption", CORRUPTION),
];
