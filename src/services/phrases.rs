//! 各语言的固定话术
//!
//! 页面脚本、旁白和场景程序共用同一张表，保证三者措辞一致。

use crate::models::Language;

/// 一种语言的全部固定话术
#[derive(Debug)]
pub struct Phrases {
    pub intro_concrete: &'static str,
    pub intro_theory: &'static str,
    pub analyze_label: &'static str,
    pub concept_label: &'static str,
    /// `{n}` 会被替换为步骤序号
    step_label: &'static str,
    /// `{n}` 会被替换为步骤序号
    step_narration: &'static str,
    pub verification: &'static str,
    pub verification_label: &'static str,
    pub next_prefix: &'static str,
    pub example: &'static str,
    pub example_label: &'static str,
    pub summary: &'static str,
    pub summary_label: &'static str,
    pub closing: &'static str,
    pub steps_unavailable: &'static str,
    pub solution_below: &'static str,
    pub title_concrete: &'static str,
    pub title_theory: &'static str,
    /// 句末标点
    pub full_stop: &'static str,
}

impl Phrases {
    /// 屏幕上的步骤标签，例如 `步骤 2`
    pub fn step_label(&self, n: u32) -> String {
        self.step_label.replace("{n}", &n.to_string())
    }

    /// 旁白中的步骤引导语，例如 `第2步，`
    pub fn step_narration(&self, n: u32) -> String {
        self.step_narration.replace("{n}", &n.to_string())
    }
}

const ZH: Phrases = Phrases {
    intro_concrete: "让我们来解决这个数学问题：",
    intro_theory: "让我们来理解这个概念：",
    analyze_label: "分析题目条件",
    concept_label: "核心概念",
    step_label: "步骤 {n}",
    step_narration: "第{n}步，",
    verification: "让我们验证一下答案的正确性",
    verification_label: "验证答案",
    next_prefix: "接下来，",
    example: "我们来看一个具体的例子",
    example_label: "举例说明",
    summary: "最后，我们来总结一下要点",
    summary_label: "总结",
    closing: "这就是完整的解题过程",
    steps_unavailable: "详细步骤请参见屏幕",
    solution_below: "解答如下",
    title_concrete: "数学解题",
    title_theory: "概念讲解",
    full_stop: "。",
};

const EN: Phrases = Phrases {
    intro_concrete: "Let's solve this math problem: ",
    intro_theory: "Let's understand this concept: ",
    analyze_label: "Analyze the problem conditions",
    concept_label: "Key concept",
    step_label: "Step {n}",
    step_narration: "Step {n}: ",
    verification: "Let's verify the answer",
    verification_label: "Verify",
    next_prefix: "Next, ",
    example: "Let's look at a concrete example",
    example_label: "Example",
    summary: "Finally, let's summarize the key points",
    summary_label: "Summary",
    closing: "That completes the solution",
    steps_unavailable: "The detailed steps are shown on screen",
    solution_below: "Solution below",
    title_concrete: "Math Solution",
    title_theory: "Concept Explained",
    full_stop: ". ",
};

const ES: Phrases = Phrases {
    intro_concrete: "Resolvamos este problema: ",
    intro_theory: "Entendamos este concepto: ",
    analyze_label: "Analizar las condiciones",
    concept_label: "Concepto clave",
    step_label: "Paso {n}",
    step_narration: "Paso {n}: ",
    verification: "Verifiquemos la respuesta",
    verification_label: "Verificación",
    next_prefix: "A continuación, ",
    example: "Veamos un ejemplo concreto",
    example_label: "Ejemplo",
    summary: "Finalmente, resumamos los puntos clave",
    summary_label: "Resumen",
    closing: "Así queda resuelto el problema",
    steps_unavailable: "Los pasos detallados se muestran en pantalla",
    solution_below: "Solución a continuación",
    title_concrete: "Solución matemática",
    title_theory: "Concepto explicado",
    full_stop: ". ",
};

const JA: Phrases = Phrases {
    intro_concrete: "この問題を解きましょう：",
    intro_theory: "この概念を理解しましょう：",
    analyze_label: "問題の条件を分析",
    concept_label: "重要な概念",
    step_label: "ステップ {n}",
    step_narration: "ステップ{n}、",
    verification: "答えを確認しましょう",
    verification_label: "検証",
    next_prefix: "次に、",
    example: "具体例を見てみましょう",
    example_label: "例",
    summary: "最後に要点をまとめましょう",
    summary_label: "まとめ",
    closing: "以上で解答は完了です",
    steps_unavailable: "詳しい手順は画面をご覧ください",
    solution_below: "解答は以下の通り",
    title_concrete: "数学の解答",
    title_theory: "概念の解説",
    full_stop: "。",
};

const FR: Phrases = Phrases {
    intro_concrete: "Résolvons ce problème : ",
    intro_theory: "Comprenons ce concept : ",
    analyze_label: "Analyser les conditions",
    concept_label: "Concept clé",
    step_label: "Étape {n}",
    step_narration: "Étape {n} : ",
    verification: "Vérifions la réponse",
    verification_label: "Vérification",
    next_prefix: "Ensuite, ",
    example: "Voyons un exemple concret",
    example_label: "Exemple",
    summary: "Enfin, résumons les points clés",
    summary_label: "Résumé",
    closing: "Voilà la solution complète",
    steps_unavailable: "Les étapes détaillées sont affichées à l'écran",
    solution_below: "Solution ci-dessous",
    title_concrete: "Solution mathématique",
    title_theory: "Concept expliqué",
    full_stop: ". ",
};

/// 获取某个语言的话术表
pub fn phrases(language: Language) -> &'static Phrases {
    match language {
        Language::Zh => &ZH,
        Language::En => &EN,
        Language::Es => &ES,
        Language::Ja => &JA,
        Language::Fr => &FR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_templates() {
        assert_eq!(phrases(Language::Zh).step_label(3), "步骤 3");
        assert_eq!(phrases(Language::Zh).step_narration(3), "第3步，");
        assert_eq!(phrases(Language::En).step_narration(1), "Step 1: ");
        assert_eq!(phrases(Language::Fr).step_label(2), "Étape 2");
    }
}
