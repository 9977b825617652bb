/// 小节类别枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Category {
    /// 英语
    English,
    /// 数学
    Math,
    /// 阅读
    Reading,
    /// 科学
    Science,
    /// 写作
    Writing,
}

impl Category {
    /// 获取接口中使用的类别名
    pub fn name(self) -> &'static str {
        match self {
            Category::English => "english",
            Category::Math => "math",
            Category::Reading => "reading",
            Category::Science => "science",
            Category::Writing => "writing",
        }
    }

    /// 获取中文显示名
    pub fn label(self) -> &'static str {
        match self {
            Category::English => "英语",
            Category::Math => "数学",
            Category::Reading => "阅读",
            Category::Science => "科学",
            Category::Writing => "写作",
        }
    }

    /// 尝试从字符串解析类别（精确匹配）
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "english" | "英语" => Some(Category::English),
            "math" | "数学" => Some(Category::Math),
            "reading" | "阅读" => Some(Category::Reading),
            "science" | "科学" => Some(Category::Science),
            "writing" | "写作" => Some(Category::Writing),
            _ => None,
        }
    }

    /// 智能查找类别（支持模糊匹配）
    pub fn find(s: &str) -> Option<Self> {
        // 先尝试精确匹配
        if let Some(category) = Self::from_str(s) {
            return Some(category);
        }

        // 模糊匹配
        let s_lower = s.to_lowercase();
        if s_lower.contains("english") || s_lower.contains("英") {
            return Some(Category::English);
        }
        if s_lower.contains("math") || s_lower.contains("数") {
            return Some(Category::Math);
        }
        if s_lower.contains("read") || s_lower.contains("阅读") {
            return Some(Category::Reading);
        }
        if s_lower.contains("science") || s_lower.contains("科学") {
            return Some(Category::Science);
        }
        if s_lower.contains("writ") || s_lower.contains("写作") {
            return Some(Category::Writing);
        }

        None
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
