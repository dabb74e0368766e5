// Character classification and folding tables.
//
// Every mapping here is strictly one code point to one code point so the
// normalized-to-original index map stays 1:1.

use ahash::AHashMap;

/// Invisible formatting code points commonly inserted to defeat matching.
pub fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

/// Fullwidth space and the fullwidth ASCII block map to their halfwidth
/// counterparts; everything else passes through.
pub fn to_halfwidth(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => {
            // offset between the fullwidth and ASCII blocks
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        _ => c,
    }
}

/// Styled, circled, ideographic and fullwidth numerals fold to ASCII digits.
pub fn fold_digit(c: char) -> Option<char> {
    let d = match c {
        // fullwidth
        '０' => '0',
        '１' => '1',
        '２' => '2',
        '３' => '3',
        '４' => '4',
        '５' => '5',
        '６' => '6',
        '７' => '7',
        '８' => '8',
        '９' => '9',
        // circled
        '⓪' => '0',
        '①' => '1',
        '②' => '2',
        '③' => '3',
        '④' => '4',
        '⑤' => '5',
        '⑥' => '6',
        '⑦' => '7',
        '⑧' => '8',
        '⑨' => '9',
        // negative circled
        '⓿' => '0',
        '❶' => '1',
        '❷' => '2',
        '❸' => '3',
        '❹' => '4',
        '❺' => '5',
        '❻' => '6',
        '❼' => '7',
        '❽' => '8',
        '❾' => '9',
        // superscript
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        // subscript
        '₀' => '0',
        '₁' => '1',
        '₂' => '2',
        '₃' => '3',
        '₄' => '4',
        '₅' => '5',
        '₆' => '6',
        '₇' => '7',
        '₈' => '8',
        '₉' => '9',
        // dingbat sans-serif circled
        '➀' => '1',
        '➁' => '2',
        '➂' => '3',
        '➃' => '4',
        '➄' => '5',
        '➅' => '6',
        '➆' => '7',
        '➇' => '8',
        '➈' => '9',
        '➊' => '1',
        '➋' => '2',
        '➌' => '3',
        '➍' => '4',
        '➎' => '5',
        '➏' => '6',
        '➐' => '7',
        '➑' => '8',
        '➒' => '9',
        // parenthesized and circled ideographs
        '㈠' => '1',
        '㈡' => '2',
        '㈢' => '3',
        '㈣' => '4',
        '㈤' => '5',
        '㈥' => '6',
        '㈦' => '7',
        '㈧' => '8',
        '㈨' => '9',
        '㊀' => '1',
        '㊁' => '2',
        '㊂' => '3',
        '㊃' => '4',
        '㊄' => '5',
        '㊅' => '6',
        '㊆' => '7',
        '㊇' => '8',
        '㊈' => '9',
        // CJK numerals
        '零' => '0',
        '〇' => '0',
        '一' => '1',
        '二' => '2',
        '三' => '3',
        '四' => '4',
        '五' => '5',
        '六' => '6',
        '七' => '7',
        '八' => '8',
        '九' => '9',
        // financial forms, Traditional variants included so the fold
        // lands before the Traditional-to-Simplified pass
        '壹' => '1',
        '贰' => '2',
        '叁' => '3',
        '肆' => '4',
        '伍' => '5',
        '陆' => '6',
        '柒' => '7',
        '捌' => '8',
        '玖' => '9',
        '貳' => '2',
        '參' => '3',
        '陸' => '6',
        _ => return None,
    };
    Some(d)
}

/// Fullwidth and enclosed Latin letters fold to basic Latin.
pub fn fold_latin_variant(c: char) -> Option<char> {
    match c {
        'Ａ'..='Ｚ' | 'ａ'..='ｚ' => char::from_u32(c as u32 - 0xFEE0),
        'Ⓐ'..='Ⓩ' => char::from_u32(c as u32 - 'Ⓐ' as u32 + 'A' as u32),
        'ⓐ'..='ⓩ' => char::from_u32(c as u32 - 'ⓐ' as u32 + 'a' as u32),
        _ => None,
    }
}

/// Single-code-point Traditional to Simplified Chinese folding.
///
/// Only characters whose simplification is itself a single code point are
/// listed; anything absent passes through unchanged.
pub fn trad_to_simp(c: char) -> Option<char> {
    let s = match c {
        '國' => '国',
        '灣' => '湾',
        '臺' => '台',
        '華' => '华',
        '語' => '语',
        '愛' => '爱',
        '東' => '东',
        '車' => '车',
        '紅' => '红',
        '馬' => '马',
        '鳥' => '鸟',
        '龍' => '龙',
        '門' => '门',
        '問' => '问',
        '間' => '间',
        '開' => '开',
        '關' => '关',
        '風' => '风',
        '飛' => '飞',
        '電' => '电',
        '買' => '买',
        '賣' => '卖',
        '見' => '见',
        '貝' => '贝',
        '頁' => '页',
        '頭' => '头',
        '顏' => '颜',
        '點' => '点',
        '學' => '学',
        '寫' => '写',
        '讀' => '读',
        '書' => '书',
        '話' => '话',
        '說' => '说',
        '誰' => '谁',
        '請' => '请',
        '謝' => '谢',
        '對' => '对',
        '雙' => '双',
        '發' => '发',
        '歲' => '岁',
        '歷' => '历',
        '時' => '时',
        '實' => '实',
        '現' => '现',
        '線' => '线',
        '紙' => '纸',
        '級' => '级',
        '維' => '维',
        '經' => '经',
        '結' => '结',
        '給' => '给',
        '絲' => '丝',
        '網' => '网',
        '羅' => '罗',
        '義' => '义',
        '習' => '习',
        '聽' => '听',
        '職' => '职',
        '聯' => '联',
        '蘇' => '苏',
        '藝' => '艺',
        '藥' => '药',
        '處' => '处',
        '號' => '号',
        '虛' => '虚',
        '計' => '计',
        '訂' => '订',
        '認' => '认',
        '討' => '讨',
        '訓' => '训',
        '記' => '记',
        '許' => '许',
        '論' => '论',
        '設' => '设',
        '訪' => '访',
        '證' => '证',
        '評' => '评',
        '識' => '识',
        '詞' => '词',
        '譯' => '译',
        '議' => '议',
        '護' => '护',
        '貴' => '贵',
        '費' => '费',
        '資' => '资',
        '賭' => '赌',
        '贏' => '赢',
        '軍' => '军',
        '輕' => '轻',
        '輸' => '输',
        '辦' => '办',
        '農' => '农',
        '運' => '运',
        '過' => '过',
        '達' => '达',
        '違' => '违',
        '遠' => '远',
        '選' => '选',
        '遺' => '遗',
        '邊' => '边',
        '鄉' => '乡',
        '醫' => '医',
        '錢' => '钱',
        '錯' => '错',
        '鎮' => '镇',
        '長' => '长',
        '閱' => '阅',
        '陸' => '陆',
        '陽' => '阳',
        '隊' => '队',
        '際' => '际',
        '雖' => '虽',
        '雲' => '云',
        '預' => '预',
        '領' => '领',
        '顧' => '顾',
        '館' => '馆',
        '驚' => '惊',
        '體' => '体',
        '麗' => '丽',
        '齊' => '齐',
        '黨' => '党',
        '鹽' => '盐',
        '憶' => '忆',
        '應' => '应',
        '戰' => '战',
        '戲' => '戏',
        '據' => '据',
        '擊' => '击',
        '壓' => '压',
        '廠' => '厂',
        '廣' => '广',
        '慶' => '庆',
        '憲' => '宪',
        '區' => '区',
        '單' => '单',
        '嚴' => '严',
        '員' => '员',
        '圖' => '图',
        '圓' => '圆',
        '團' => '团',
        '場' => '场',
        '壞' => '坏',
        '聲' => '声',
        '備' => '备',
        '傳' => '传',
        '傷' => '伤',
        '價' => '价',
        '儀' => '仪',
        '億' => '亿',
        '優' => '优',
        '兒' => '儿',
        '內' => '内',
        '兩' => '两',
        '冊' => '册',
        '凍' => '冻',
        '剛' => '刚',
        '創' => '创',
        '動' => '动',
        '務' => '务',
        '勝' => '胜',
        '勞' => '劳',
        '協' => '协',
        '參' => '参',
        '變' => '变',
        '嗎' => '吗',
        '嘆' => '叹',
        '嚇' => '吓',
        '幣' => '币',
        '幾' => '几',
        '庫' => '库',
        '廢' => '废',
        '張' => '张',
        '彈' => '弹',
        '復' => '复',
        '總' => '总',
        '惡' => '恶',
        '憂' => '忧',
        '懷' => '怀',
        '擁' => '拥',
        '擇' => '择',
        '擔' => '担',
        '攝' => '摄',
        '敗' => '败',
        '數' => '数',
        '斷' => '断',
        '無' => '无',
        '舊' => '旧',
        '極' => '极',
        '樂' => '乐',
        '標' => '标',
        '樣' => '样',
        '橋' => '桥',
        '機' => '机',
        '檢' => '检',
        '權' => '权',
        '歡' => '欢',
        '毀' => '毁',
        '氣' => '气',
        '漢' => '汉',
        '滅' => '灭',
        '濟' => '济',
        '滿' => '满',
        '潔' => '洁',
        '澤' => '泽',
        '烏' => '乌',
        '為' => '为',
        '熱' => '热',
        '燈' => '灯',
        '爭' => '争',
        '獨' => '独',
        '獲' => '获',
        '環' => '环',
        '產' => '产',
        '畫' => '画',
        '異' => '异',
        '當' => '当',
        '療' => '疗',
        '眾' => '众',
        '礎' => '础',
        '確' => '确',
        '禮' => '礼',
        '種' => '种',
        '稱' => '称',
        '穩' => '稳',
        '窮' => '穷',
        '築' => '筑',
        '簡' => '简',
        '糧' => '粮',
        '純' => '纯',
        '統' => '统',
        '絕' => '绝',
        '繼' => '继',
        '續' => '续',
        '纖' => '纤',
        '聞' => '闻',
        '興' => '兴',
        '舉' => '举',
        '萬' => '万',
        '葉' => '叶',
        '蘭' => '兰',
        '衛' => '卫',
        '裝' => '装',
        '製' => '制',
        _ => return None,
    };
    Some(s)
}

/// Built-in table of characters visually confusable with basic Latin,
/// drawn from the fullwidth, Greek and Cyrillic blocks.
pub fn default_homoglyphs() -> AHashMap<char, char> {
    let mut map = AHashMap::with_capacity(96);

    // fullwidth letters and digits
    for c in 'Ａ'..='Ｚ' {
        map.insert(c, char::from_u32(c as u32 - 0xFEE0).unwrap());
    }
    for c in 'ａ'..='ｚ' {
        map.insert(c, char::from_u32(c as u32 - 0xFEE0).unwrap());
    }
    for c in '０'..='９' {
        map.insert(c, char::from_u32(c as u32 - 0xFEE0).unwrap());
    }

    // Greek and Cyrillic lookalikes
    let confusable: &[(char, char)] = &[
        ('ο', 'o'), // Greek omicron
        ('ι', 'i'), // Greek iota
        ('τ', 't'), // Greek tau
        ('а', 'a'), // Cyrillic a
        ('е', 'e'), // Cyrillic e
        ('о', 'o'), // Cyrillic o
        ('р', 'p'), // Cyrillic er
        ('с', 'c'), // Cyrillic es
        ('у', 'y'), // Cyrillic u
        ('х', 'x'), // Cyrillic ha
    ];
    map.extend(confusable.iter().copied());

    map
}
